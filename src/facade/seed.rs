//! Sample data for both domains
//!
//! Seeding goes through the regular facade operations, so every cascade and
//! validation applies exactly as it does for user input.

use chrono::NaiveDate;
use tracing::info;

use crate::core::error::{Result, TroveError};
use crate::core::identity::EntityKind;
use crate::core::store::Store;

use super::library::{Library, NewBook, NewDvd, NewMagazine, NewUser};
use super::organization::{NewDepartment, NewEmployee, NewEquipment, NewProject, Organization};

/// Records created per kind
pub type SeedCounts = Vec<(EntityKind, usize)>;

fn day(y: i32, m: u32, d: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| TroveError::invalid("date", format!("{y}-{m}-{d} is not a calendar date")))
}

const DEPARTMENTS: &[(&str, &str, &str, f64)] = &[
    ("D001", "Marine Ecology", "Coast", 1_000_000.0),
    ("D002", "Grassland Survey", "Plains", 1_500_000.0),
    ("D003", "Woodland Care", "Highlands", 1_200_000.0),
    ("D004", "Visitor Programs", "Headquarters", 800_000.0),
    ("D005", "Field Data", "Headquarters", 600_000.0),
];

/// id, name, department, title, salary, extra (authority, specialization or certifications)
type StaffRow = (&'static str, &'static str, &'static str, &'static str, f64, &'static str);

const MANAGERS: &[(&str, &str, &str, f64, f64)] = &[
    ("M001", "Rosa Lindqvist", "D001", 85_000.0, 500_000.0),
    ("M002", "Tomas Alder", "D002", 90_000.0, 600_000.0),
    ("M003", "Ines Carvalho", "D003", 88_000.0, 550_000.0),
    ("M004", "Piet Maarsen", "D004", 82_000.0, 400_000.0),
    ("M005", "Hana Sato", "D005", 95_000.0, 300_000.0),
];

const SCIENTISTS: &[StaffRow] = &[
    ("S001", "Leon Brandt", "D001", "Senior Marine Biologist", 70_000.0, "Reef Ecology"),
    ("S002", "Mira Kovac", "D001", "Marine Researcher", 68_000.0, "Plankton Dynamics"),
    ("S003", "Aran Pike", "D002", "Wildlife Biologist", 75_000.0, "Animal Behavior"),
    ("S004", "Lotte Weiss", "D002", "Ecologist", 72_000.0, "Grassland Ecology"),
    ("S005", "Ravi Menon", "D002", "Conservation Biologist", 70_000.0, "Population Genetics"),
    ("S006", "Yara Haddad", "D003", "Forestry Scientist", 71_000.0, "Silviculture"),
    ("S007", "Oskar Berg", "D003", "Botanist", 69_000.0, "Understory Flora"),
    ("S008", "Nell Porter", "D004", "Visitor Ecologist", 66_000.0, "Trail Impact"),
    ("S009", "Ayo Bello", "D005", "Data Scientist", 78_000.0, "Environmental Statistics"),
    ("S010", "Kai Lorenz", "D005", "GIS Specialist", 76_000.0, "Remote Sensing"),
];

const TECHNICIANS: &[StaffRow] = &[
    ("T001", "Sven Ek", "D001", "Field Technician", 45_000.0, "Diving, Boat Handling, First Aid"),
    ("T002", "Ada Moreau", "D001", "Lab Technician", 43_000.0, "Water Testing, Sampling"),
    ("T003", "Bo Lindgren", "D002", "Field Technician", 46_000.0, "GPS, Camera Traps, Tracking"),
    ("T004", "Cleo Varga", "D002", "Research Technician", 44_000.0, "Drone Operation, Telemetry"),
    ("T005", "Dario Conti", "D003", "Forestry Technician", 45_000.0, "Chainsaw, Heavy Machinery"),
    ("T006", "Elin Strand", "D004", "Visitor Technician", 42_000.0, "Photography, Guiding"),
    ("T007", "Femi Adeyemi", "D005", "IT Technician", 48_000.0, "Databases, Networking"),
];

/// id, name, description, department, lead, budget, start (y, m, d), end (y, m, d)
type ProjectRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    f64,
    (i32, u32, u32),
    (i32, u32, u32),
);

const PROJECTS: &[ProjectRow] = &[
    ("P001", "Reef Restoration", "Replanting damaged reef sections", "D001", "S001", 250_000.0, (2024, 3, 1), (2025, 2, 28)),
    ("P002", "Plankton Census", "Seasonal plankton sampling", "D001", "S002", 180_000.0, (2024, 4, 1), (2024, 12, 31)),
    ("P003", "Herd Movement Study", "Tracking seasonal migration", "D002", "S003", 320_000.0, (2024, 1, 15), (2025, 12, 31)),
    ("P004", "Grass Recovery Plots", "Measuring regrowth after grazing", "D002", "S004", 150_000.0, (2024, 5, 1), (2025, 4, 30)),
    ("P005", "Canopy Mapping", "Mapping canopy cover change", "D003", "S006", 210_000.0, (2024, 2, 1), (2025, 1, 31)),
    ("P006", "Trail Erosion Review", "Assessing visitor trail wear", "D004", "S008", 90_000.0, (2024, 6, 1), (2024, 11, 30)),
    ("P007", "Sensor Data Platform", "Central store for field sensors", "D005", "S009", 140_000.0, (2024, 3, 15), (2025, 3, 14)),
    ("P008", "Satellite Land Cover", "Classifying land cover from imagery", "D005", "S010", 160_000.0, (2024, 4, 1), (2025, 3, 31)),
];

/// id, name, type, department, holder
const EQUIPMENT: &[(&str, &str, &str, &str, Option<&str>)] = &[
    ("E001", "Dive Compressor", "Diving", "D001", Some("T001")),
    ("E002", "Research Skiff", "Vessel", "D001", Some("T001")),
    ("E003", "Water Quality Probe", "Sensor", "D001", Some("T002")),
    ("E004", "Camera Trap Set", "Camera", "D002", Some("T003")),
    ("E005", "Survey Drone", "Drone", "D002", Some("T004")),
    ("E006", "GPS Collar Kit", "Tracking", "D002", None),
    ("E007", "Forestry Saw", "Tool", "D003", Some("T005")),
    ("E008", "Soil Corer", "Tool", "D003", None),
    ("E009", "Field Camera", "Camera", "D004", Some("T006")),
    ("E010", "Data Server", "Computer", "D005", None),
    ("E011", "Rugged Laptop", "Computer", "D005", None),
    ("E012", "Weather Station", "Sensor", "D005", None),
];

fn staff(row: &StaffRow, hired: NaiveDate) -> NewEmployee {
    let (id, name, dept, title, salary, _) = *row;
    NewEmployee {
        id: Some(id.to_string()),
        name: name.to_string(),
        email: contact_email(name),
        phone: format!("+1-555-{}", &id[1..]),
        department_id: dept.to_string(),
        role: title.to_string(),
        salary,
        hire_date: hired,
    }
}

fn contact_email(name: &str) -> String {
    format!("{}@trove.example", name.to_lowercase().replace(' ', "."))
}

/// Fill an empty organization with departments, staff, projects and equipment
pub fn seed_organization<S: Store>(org: &mut Organization<S>) -> Result<SeedCounts> {
    if !(org.employees().is_empty() && org.departments().is_empty()) {
        return Err(TroveError::precondition(
            "seed organization",
            "the organization already holds records",
        ));
    }

    for &(id, name, region, budget) in DEPARTMENTS {
        org.add_department(NewDepartment {
            id: Some(id.to_string()),
            name: name.to_string(),
            region: region.to_string(),
            budget,
        })?;
    }

    let hired = day(2024, 1, 15)?;
    for &(id, name, dept, salary, authority) in MANAGERS {
        let row: StaffRow = (id, name, dept, "Department Head", salary, "");
        org.add_manager(staff(&row, hired), authority)?;
        org.assign_department_manager(dept, id)?;
    }
    let hired = day(2024, 2, 1)?;
    for row in SCIENTISTS {
        org.add_scientist(staff(row, hired), row.5)?;
    }
    let hired = day(2024, 4, 1)?;
    for row in TECHNICIANS {
        org.add_technician(staff(row, hired), row.5)?;
    }

    for &(id, name, description, dept, lead, budget, start, end) in PROJECTS {
        org.add_project(NewProject {
            id: Some(id.to_string()),
            name: name.to_string(),
            description: description.to_string(),
            department_id: dept.to_string(),
            lead_scientist_id: lead.to_string(),
            budget,
            start_date: day(start.0, start.1, start.2)?,
            end_date: day(end.0, end.1, end.2)?,
        })?;
    }

    let purchased = day(2023, 6, 1)?;
    for &(id, name, kind, dept, holder) in EQUIPMENT {
        org.add_equipment(NewEquipment {
            id: Some(id.to_string()),
            name: name.to_string(),
            equipment_type: kind.to_string(),
            serial_number: format!("SN-{}-{}", kind.to_uppercase(), &id[1..]),
            department_id: dept.to_string(),
            purchase_date: purchased,
        })?;
        if let Some(technician) = holder {
            org.assign_equipment(id, technician)?;
        }
    }

    let counts = vec![
        (EntityKind::Department, org.departments().len()),
        (EntityKind::Employee, org.employees().len()),
        (EntityKind::Project, org.projects().len()),
        (EntityKind::Equipment, org.equipment().len()),
    ];
    info!(?counts, "organization seeded");
    Ok(counts)
}

/// (id, name, member since (y, m, d)); `None` marks the librarian
const USERS: &[(&str, &str, Option<(i32, u32, u32)>)] = &[
    ("U001", "Maren Holt", None),
    ("U002", "Jonas Frey", Some((2022, 9, 1))),
    ("U003", "Lina Ortega", Some((2023, 1, 12))),
    ("U004", "Teo Marsh", Some((2023, 5, 30))),
    ("U005", "Priya Nair", Some((2023, 11, 4))),
    ("U006", "Gus Henley", Some((2024, 2, 18))),
];

/// Fill an empty library with users and a small catalog
pub fn seed_library<S: Store>(lib: &mut Library<S>) -> Result<SeedCounts> {
    if !(lib.users().is_empty() && lib.media().is_empty()) {
        return Err(TroveError::precondition(
            "seed library",
            "the library already holds records",
        ));
    }

    for &(id, name, joined) in USERS {
        let new = NewUser {
            id: Some(id.to_string()),
            name: name.to_string(),
            email: contact_email(name),
            phone: format!("+1-555-2{}", &id[1..]),
        };
        match joined {
            Some((y, m, d)) => lib.register_member(new, day(y, m, d)?)?,
            None => lib.register_librarian(new, "L-017", "Circulation Desk", day(2015, 6, 1)?)?,
        };
    }

    lib.add_book(NewBook {
        id: Some("M001".into()),
        title: "The Tidal Shelf".into(),
        author: "Edda Norberg".into(),
        isbn: "978-0-11-000101-3".into(),
        pages: 412,
        publisher: "Saltmarsh Press".into(),
    })?;
    lib.add_magazine(NewMagazine {
        id: Some("M002".into()),
        title: "Field Notes Quarterly".into(),
        issue_number: 42,
        publisher: "Open Country Media".into(),
        publication_date: day(2024, 3, 1)?,
    })?;
    lib.add_dvd(NewDvd {
        id: Some("M003".into()),
        title: "Below the Thermocline".into(),
        director: "Ruth Ambler".into(),
        duration_minutes: 96,
        genre: "Documentary".into(),
        release_year: 2021,
    })?;
    lib.add_book(NewBook {
        id: Some("M004".into()),
        title: "Counting Herds".into(),
        author: "Amos Keel".into(),
        isbn: "978-0-11-000007-8".into(),
        pages: 288,
        publisher: "Longgrass Books".into(),
    })?;
    lib.add_book(NewBook {
        id: Some("M005".into()),
        title: "A Year Under Canopy".into(),
        author: "Edda Norberg".into(),
        isbn: "978-0-11-000450-2".into(),
        pages: 356,
        publisher: "Saltmarsh Press".into(),
    })?;
    lib.add_magazine(NewMagazine {
        id: Some("M006".into()),
        title: "Coastal Review".into(),
        issue_number: 7,
        publisher: "Harbor Guild".into(),
        publication_date: day(2024, 5, 15)?,
    })?;
    lib.add_dvd(NewDvd {
        id: Some("M007".into()),
        title: "Night on the Plains".into(),
        director: "Sol Varela".into(),
        duration_minutes: 58,
        genre: "Nature".into(),
        release_year: 2018,
    })?;

    let counts = vec![
        (EntityKind::User, lib.users().len()),
        (EntityKind::Media, lib.media().len()),
    ];
    info!(?counts, "library seeded");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::entities::{EquipmentStatus, MediaType, RoleType};

    #[test]
    fn test_seed_organization_is_consistent() {
        let mut org = Organization::open(MemoryStore::new()).unwrap();
        let counts = seed_organization(&mut org).unwrap();

        assert_eq!(counts[1], (EntityKind::Employee, 22));
        assert!(org.check_consistency().is_empty());
        assert_eq!(org.generate_next_employee_id(RoleType::Scientist).unwrap(), "S011");
        assert_eq!(
            org.find_equipment("E010").unwrap().status,
            EquipmentStatus::Available
        );
        assert!(seed_organization(&mut org).unwrap_err().is_precondition());
    }

    #[test]
    fn test_seeded_equipment_can_go_to_t007() {
        let mut org = Organization::open(MemoryStore::new()).unwrap();
        seed_organization(&mut org).unwrap();
        org.assign_equipment("E010", "T007").unwrap();
        assert_eq!(org.find_employee("T007").unwrap().linked_ids(), ["E010".to_string()]);
    }

    #[test]
    fn test_seed_library() {
        let mut lib = Library::open(MemoryStore::new()).unwrap();
        seed_library(&mut lib).unwrap();

        assert_eq!(lib.members().len(), 5);
        assert_eq!(lib.find_media("M003").unwrap().media_type(), MediaType::Dvd);
        assert!(lib.find_user("U005").unwrap().can_borrow());
        assert!(lib.check_consistency().is_empty());
        assert!(seed_library(&mut lib).is_err());
    }
}

//! Library facade: users, media and the circulation protocol

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::entity::{push_unique, remove_id};
use crate::core::error::{ensure_present, Result, TroveError};
use crate::core::identity::EntityKind;
use crate::core::query::{
    binary_search, bubble_sort, contains_ignore_case, cmp_ignore_case, linear_search, quick_sort,
    SortAlgorithm,
};
use crate::core::store::Store;
use crate::entities::transaction::DEFAULT_LOAN_PERIOD_DAYS;
use crate::entities::{MediaDetails, MediaItem, Transaction, User, UserRole};

use super::{ensure_new_id, find, generate_id, index_of, locate, IdMatch, Inconsistency};

/// Library ids are matched exactly
const IDS: IdMatch = IdMatch::Exact;

/// Contact fields for a new user; the id is generated when absent
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub pages: u32,
    pub publisher: String,
}

#[derive(Debug, Clone)]
pub struct NewMagazine {
    pub id: Option<String>,
    pub title: String,
    pub issue_number: u32,
    pub publisher: String,
    pub publication_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewDvd {
    pub id: Option<String>,
    pub title: String,
    pub director: String,
    pub duration_minutes: u32,
    pub genre: String,
    pub release_year: i32,
}

/// An open loan past its due date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueLoan {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub days_late: i64,
    /// Fee the member would be charged if the item came back today
    pub accrued_fee: f64,
}

/// Summary figures for the library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryStatistics {
    pub media: usize,
    pub available: usize,
    pub borrowed: usize,
    pub users: usize,
    pub members: usize,
    pub active_loans: usize,
    pub transactions: usize,
    pub outstanding_fines: f64,
}

#[derive(Debug, Clone, Default)]
struct LibraryState {
    users: Vec<User>,
    media: Vec<MediaItem>,
    transactions: Vec<Transaction>,
}

/// Owns the library's records and runs borrowing and returns
pub struct Library<S: Store> {
    store: S,
    state: LibraryState,
    loan_period_days: u32,
}

impl<S: Store> Library<S> {
    /// Load users, media and transactions with the default loan period
    pub fn open(store: S) -> Result<Self> {
        Self::with_loan_period(store, DEFAULT_LOAN_PERIOD_DAYS)
    }

    pub fn with_loan_period(store: S, loan_period_days: u32) -> Result<Self> {
        if loan_period_days == 0 {
            return Err(TroveError::invalid("loan_period_days", "must be at least one day"));
        }
        let state = LibraryState {
            users: store.load_all()?,
            media: store.load_all()?,
            transactions: store.load_all()?,
        };
        info!(
            users = state.users.len(),
            media = state.media.len(),
            transactions = state.transactions.len(),
            loan_period_days,
            "library loaded"
        );
        Ok(Self {
            store,
            state,
            loan_period_days,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn loan_period_days(&self) -> u32 {
        self.loan_period_days
    }

    fn commit(&mut self, next: LibraryState, dirty: &[EntityKind]) -> Result<()> {
        for kind in dirty {
            match kind {
                EntityKind::User => self.store.save_all(&next.users)?,
                EntityKind::Media => self.store.save_all(&next.media)?,
                EntityKind::Transaction => self.store.save_all(&next.transactions)?,
                other => debug!(kind = %other, "not a library collection"),
            }
        }
        self.state = next;
        Ok(())
    }

    pub fn users(&self) -> &[User] {
        &self.state.users
    }

    pub fn media(&self) -> &[MediaItem] {
        &self.state.media
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    // ==================== Users ====================

    pub fn register_member(&mut self, new: NewUser, joined: NaiveDate) -> Result<User> {
        self.insert_user(
            new,
            UserRole::Member {
                membership_date: joined,
                borrowed_items: Vec::new(),
                fines: 0.0,
            },
        )
    }

    pub fn register_librarian(
        &mut self,
        new: NewUser,
        employee_id: &str,
        position: &str,
        hire_date: NaiveDate,
    ) -> Result<User> {
        self.insert_user(
            new,
            UserRole::Librarian {
                employee_id: employee_id.to_string(),
                position: position.to_string(),
                hire_date,
            },
        )
    }

    fn insert_user(&mut self, new: NewUser, role: UserRole) -> Result<User> {
        let id = match new.id {
            Some(id) => id,
            None => generate_id(&self.state.users, "U", IDS)?,
        };
        ensure_new_id(&self.state.users, &id, IDS)?;
        ensure_present("name", &new.name)?;

        let user = User {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            role,
        };
        let mut next = self.state.clone();
        next.users.push(user.clone());
        self.commit(next, &[EntityKind::User])?;

        info!(id = %user.id, role = user.role.as_str(), "user registered");
        Ok(user)
    }

    pub fn find_user(&self, id: &str) -> Result<&User> {
        find(&self.state.users, id, IDS)
    }

    pub fn members(&self) -> Vec<&User> {
        linear_search(&self.state.users, User::is_member)
    }

    /// Reduce a member's fines by `amount`, never below zero
    pub fn pay_fine(&mut self, user_id: &str, amount: f64) -> Result<User> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TroveError::invalid("amount", "must be greater than zero"));
        }
        let u = locate(&self.state.users, user_id, IDS)?;
        if !self.state.users[u].is_member() {
            return Err(TroveError::precondition(
                "pay fine",
                format!("{} is not a member", self.state.users[u].id),
            ));
        }

        let mut next = self.state.clone();
        next.users[u].pay_fine(amount);
        let updated = next.users[u].clone();
        self.commit(next, &[EntityKind::User])?;

        info!(user = %updated.id, amount, remaining = updated.fines(), "fine paid");
        Ok(updated)
    }

    // ==================== Media ====================

    pub fn add_book(&mut self, new: NewBook) -> Result<MediaItem> {
        self.insert_media(
            new.id,
            &new.title,
            MediaDetails::Book {
                author: new.author,
                isbn: new.isbn,
                pages: new.pages,
                publisher: new.publisher,
            },
        )
    }

    pub fn add_magazine(&mut self, new: NewMagazine) -> Result<MediaItem> {
        self.insert_media(
            new.id,
            &new.title,
            MediaDetails::Magazine {
                issue_number: new.issue_number,
                publisher: new.publisher,
                publication_date: new.publication_date,
            },
        )
    }

    pub fn add_dvd(&mut self, new: NewDvd) -> Result<MediaItem> {
        self.insert_media(
            new.id,
            &new.title,
            MediaDetails::Dvd {
                director: new.director,
                duration_minutes: new.duration_minutes,
                genre: new.genre,
                release_year: new.release_year,
            },
        )
    }

    fn insert_media(&mut self, id: Option<String>, title: &str, details: MediaDetails) -> Result<MediaItem> {
        let id = match id {
            Some(id) => id,
            None => generate_id(&self.state.media, "M", IDS)?,
        };
        ensure_new_id(&self.state.media, &id, IDS)?;
        ensure_present("title", title)?;

        let item = MediaItem::new(&id, title, details);
        let mut next = self.state.clone();
        next.media.push(item.clone());
        self.commit(next, &[EntityKind::Media])?;

        info!(id = %item.id, media_type = %item.media_type(), "media added");
        Ok(item)
    }

    /// Delete an item that is on the shelf
    pub fn remove_media(&mut self, id: &str) -> Result<MediaItem> {
        let m = locate(&self.state.media, id, IDS)?;
        if let Some(ref holder) = self.state.media[m].borrowed_by {
            return Err(TroveError::precondition(
                "remove media",
                format!("{} is borrowed by {holder}", self.state.media[m].id),
            ));
        }

        let mut next = self.state.clone();
        let removed = next.media.remove(m);
        self.commit(next, &[EntityKind::Media])?;

        info!(id = %removed.id, "media removed");
        Ok(removed)
    }

    pub fn find_media(&self, id: &str) -> Result<&MediaItem> {
        find(&self.state.media, id, IDS)
    }

    pub fn search_by_title(&self, fragment: &str) -> Vec<&MediaItem> {
        linear_search(&self.state.media, |m| contains_ignore_case(&m.title, fragment))
    }

    /// Books whose author contains `fragment`
    pub fn search_by_author(&self, fragment: &str) -> Vec<&MediaItem> {
        linear_search(&self.state.media, |m| {
            m.author().is_some_and(|a| contains_ignore_case(a, fragment))
        })
    }

    /// Binary search over the books sorted by ISBN
    pub fn find_by_isbn(&self, isbn: &str) -> Option<&MediaItem> {
        let books: Vec<&MediaItem> = self.state.media.iter().filter(|m| m.isbn().is_some()).collect();
        let sorted = quick_sort(&books, |a, b| a.isbn().cmp(&b.isbn()));
        binary_search(&sorted, |m| (*m).isbn().unwrap_or_default(), &isbn).copied()
    }

    pub fn available_media(&self) -> Vec<&MediaItem> {
        linear_search(&self.state.media, |m| m.available)
    }

    pub fn borrowed_media(&self) -> Vec<&MediaItem> {
        linear_search(&self.state.media, |m| !m.available)
    }

    pub fn sort_by_title(&self, algorithm: SortAlgorithm) -> Vec<&MediaItem> {
        let refs: Vec<&MediaItem> = self.state.media.iter().collect();
        algorithm.sort(&refs, |a, b| cmp_ignore_case(&a.title, &b.title))
    }

    /// Available items first, otherwise in catalog order
    pub fn sort_by_availability(&self) -> Vec<&MediaItem> {
        let refs: Vec<&MediaItem> = self.state.media.iter().collect();
        bubble_sort(&refs, |a, b| b.available.cmp(&a.available))
    }

    // ==================== Circulation ====================

    /// Lend `media_id` to `user_id` starting `today`
    pub fn borrow(&mut self, user_id: &str, media_id: &str, today: NaiveDate) -> Result<Transaction> {
        let u = locate(&self.state.users, user_id, IDS)?;
        let user = &self.state.users[u];
        if !user.is_member() {
            return Err(TroveError::precondition(
                "borrow",
                format!("{} is not a member", user.id),
            ));
        }
        if user.fines() > 0.0 {
            return Err(TroveError::FinesOutstanding {
                user_id: user.id.clone(),
                fines: user.fines(),
            });
        }
        let m = locate(&self.state.media, media_id, IDS)?;
        if !self.state.media[m].available {
            return Err(TroveError::NotAvailable {
                kind: EntityKind::Media,
                id: self.state.media[m].id.clone(),
            });
        }

        let id = generate_id(&self.state.transactions, "T", IDS)?;
        let mut next = self.state.clone();
        let transaction = Transaction::open(&id, user_id, media_id, today, self.loan_period_days);
        next.transactions.push(transaction.clone());
        next.media[m].check_out(user_id);
        if let Some(items) = next.users[u].borrowed_items_mut() {
            push_unique(items, media_id);
        }
        self.commit(
            next,
            &[EntityKind::Transaction, EntityKind::Media, EntityKind::User],
        )?;

        info!(
            transaction = %transaction.id,
            user = user_id,
            media = media_id,
            due = %transaction.due_date,
            "item borrowed"
        );
        Ok(transaction)
    }

    /// Close the open loan of `media_id` to `user_id`, charging any late fee
    pub fn return_item(&mut self, user_id: &str, media_id: &str, today: NaiveDate) -> Result<Transaction> {
        let Some(t) = self
            .state
            .transactions
            .iter()
            .position(|t| t.is_open_for(user_id, media_id))
        else {
            return Err(TroveError::NoActiveTransaction {
                user_id: user_id.to_string(),
                media_id: media_id.to_string(),
            });
        };
        let borrowed_on = self.state.transactions[t].borrow_date;
        if today < borrowed_on {
            return Err(TroveError::invalid(
                "return date",
                format!("{today} is before the loan started on {borrowed_on}"),
            ));
        }
        let u = locate(&self.state.users, user_id, IDS)?;
        let m = locate(&self.state.media, media_id, IDS)?;

        let mut next = self.state.clone();
        let loan = &mut next.transactions[t];
        loan.return_date = Some(today);
        let days_late = loan.days_late(today);
        if days_late > 0 {
            loan.late_fee = next.media[m].late_fee(days_late);
            next.users[u].add_fine(loan.late_fee);
        }
        let transaction = loan.clone();
        next.media[m].check_in();
        if let Some(items) = next.users[u].borrowed_items_mut() {
            remove_id(items, media_id);
        }
        self.commit(
            next,
            &[EntityKind::Transaction, EntityKind::Media, EntityKind::User],
        )?;

        if days_late > 0 {
            warn!(
                transaction = %transaction.id,
                days_late,
                fee = transaction.late_fee,
                "item returned late"
            );
        } else {
            info!(transaction = %transaction.id, "item returned");
        }
        Ok(transaction)
    }

    /// Open loans of one user
    pub fn loans_of(&self, user_id: &str) -> Result<Vec<&Transaction>> {
        let u = locate(&self.state.users, user_id, IDS)?;
        let id = &self.state.users[u].id;
        Ok(linear_search(&self.state.transactions, |t| {
            !t.is_completed() && &t.user_id == id
        }))
    }

    /// Open loans past due as of `today`
    pub fn overdue(&self, today: NaiveDate) -> Vec<OverdueLoan> {
        self.state
            .transactions
            .iter()
            .filter(|t| t.is_overdue(today))
            .map(|t| {
                let days_late = t.days_late(today);
                let accrued_fee = index_of(&self.state.media, &t.media_id, IDS)
                    .map(|m| self.state.media[m].late_fee(days_late))
                    .unwrap_or_default();
                OverdueLoan {
                    transaction: t.clone(),
                    days_late,
                    accrued_fee,
                }
            })
            .collect()
    }

    // ==================== Reporting ====================

    pub fn statistics(&self) -> LibraryStatistics {
        let available = self.state.media.iter().filter(|m| m.available).count();
        LibraryStatistics {
            media: self.state.media.len(),
            available,
            borrowed: self.state.media.len() - available,
            users: self.state.users.len(),
            members: self.state.users.iter().filter(|u| u.is_member()).count(),
            active_loans: self
                .state
                .transactions
                .iter()
                .filter(|t| !t.is_completed())
                .count(),
            transactions: self.state.transactions.len(),
            outstanding_fines: self.state.users.iter().map(User::fines).sum(),
        }
    }

    /// Cross-check media flags, member loan lists and open transactions
    pub fn check_consistency(&self) -> Vec<Inconsistency> {
        let state = &self.state;
        let mut found = Vec::new();

        for item in &state.media {
            if item.available == item.borrowed_by.is_some() {
                found.push(Inconsistency::new(
                    EntityKind::Media,
                    &item.id,
                    format!(
                        "available is {} but borrowed_by is {:?}",
                        item.available, item.borrowed_by
                    ),
                ));
            }
            if let Some(ref holder) = item.borrowed_by {
                let open = state
                    .transactions
                    .iter()
                    .filter(|t| t.is_open_for(holder, &item.id))
                    .count();
                if open != 1 {
                    found.push(Inconsistency::new(
                        EntityKind::Media,
                        &item.id,
                        format!("borrowed by {holder} with {open} open transaction(s)"),
                    ));
                }
            }
        }

        for user in &state.users {
            if user.fines() < 0.0 {
                found.push(Inconsistency::new(
                    EntityKind::User,
                    &user.id,
                    format!("negative fines {:.2}", user.fines()),
                ));
            }
            for media_id in user.borrowed_items() {
                let holds = index_of(&state.media, media_id, IDS)
                    .is_some_and(|m| state.media[m].borrowed_by.as_deref() == Some(user.id.as_str()));
                if !holds {
                    found.push(Inconsistency::new(
                        EntityKind::User,
                        &user.id,
                        format!("lists {media_id} which it does not hold"),
                    ));
                }
            }
        }

        for t in state.transactions.iter().filter(|t| !t.is_completed()) {
            let mut problems = Vec::new();
            if index_of(&state.users, &t.user_id, IDS).is_none() {
                problems.push(format!("user {} does not exist", t.user_id));
            }
            if index_of(&state.media, &t.media_id, IDS).is_none() {
                problems.push(format!("media {} does not exist", t.media_id));
            }
            let duplicates = state
                .transactions
                .iter()
                .filter(|o| o.is_open_for(&t.user_id, &t.media_id))
                .count();
            if duplicates > 1 {
                problems.push(format!("{duplicates} open loans for the same pair"));
            }
            for problem in problems {
                found.push(Inconsistency::new(EntityKind::Transaction, &t.id, problem));
            }
        }

        debug!(issues = found.len(), "library consistency check complete");
        found
    }
}

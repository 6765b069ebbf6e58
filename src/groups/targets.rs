use crate::api::models::Target;
use crate::groups::markup::{escape, unescape};

/// One row of the targets table, every field already escaped for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub department_number: String,
    pub age: String,
    pub gender: String,
    pub site: String,
    pub phone: String,
    pub degree: String,
    pub description: String,
}

impl TargetRow {
    pub fn from_target(target: &Target) -> Self {
        Self {
            first_name: escape(&target.first_name),
            last_name: escape(&target.last_name),
            email: escape(&target.email),
            position: escape(&target.position),
            department: escape(&target.department),
            department_number: escape(&target.department_number),
            age: escape(&target.age),
            gender: escape(&target.gender),
            site: escape(&target.site),
            phone: escape(&target.phone),
            degree: escape(&target.degree),
            description: escape(&target.description),
        }
    }

    /// The original values, ready to be sent to the server.
    pub fn to_target(&self) -> Target {
        Target {
            first_name: unescape(&self.first_name),
            last_name: unescape(&self.last_name),
            email: unescape(&self.email),
            position: unescape(&self.position),
            department: unescape(&self.department),
            department_number: unescape(&self.department_number),
            age: unescape(&self.age),
            gender: unescape(&self.gender),
            site: unescape(&self.site),
            phone: unescape(&self.phone),
            degree: unescape(&self.degree),
            description: unescape(&self.description),
        }
    }

    fn matches_email(&self, normalized: &str) -> bool {
        self.email.to_lowercase() == normalized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(usize),
    Replaced(usize),
}

/// Pending targets of one edit session, unique by email.
#[derive(Debug, Default, Clone)]
pub struct TargetRowStore {
    rows: Vec<TargetRow>,
}

impl TargetRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TargetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds a target, or overwrites the row that already has its email.
    /// The email is lower-cased; a replaced row keeps its position.
    pub fn add_target(&mut self, target: &Target) -> AddOutcome {
        let mut row = TargetRow::from_target(target);
        row.email = escape(&target.email.to_lowercase());
        match self.rows.iter().position(|r| r.matches_email(&row.email)) {
            Some(index) => {
                self.rows[index] = row;
                AddOutcome::Replaced(index)
            }
            None => {
                self.rows.push(row);
                AddOutcome::Added(self.rows.len() - 1)
            }
        }
    }

    /// Merges records returned by a CSV import. Returns how many rows were new.
    pub fn merge(&mut self, targets: &[Target]) -> usize {
        targets
            .iter()
            .filter(|t| matches!(self.add_target(t), AddOutcome::Added(_)))
            .count()
    }

    /// Replaces the table with a group's saved targets, as the server sent them.
    pub fn load(&mut self, targets: &[Target]) {
        self.rows = targets.iter().map(TargetRow::from_target).collect();
    }

    pub fn remove(&mut self, index: usize) -> Option<TargetRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn to_targets(&self) -> Vec<Target> {
        self.rows.iter().map(TargetRow::to_target).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Email is required")]
    MissingEmail,
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),
}

/// Constraints the manual entry form enforces before a row is added.
pub fn validate_entry(target: &Target) -> Result<(), FormError> {
    let email = target.email.trim();
    if email.is_empty() {
        return Err(FormError::MissingEmail);
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid { Ok(()) } else { Err(FormError::InvalidEmail(email.to_string())) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(first: &str, email: &str) -> Target {
        Target {
            first_name: first.into(),
            email: email.into(),
            ..Target::default()
        }
    }

    #[test]
    fn new_email_appends_one_row() {
        let mut store = TargetRowStore::new();
        assert_eq!(store.add_target(&target("Ann", "ann@ex.com")), AddOutcome::Added(0));
        assert_eq!(store.add_target(&target("Bob", "bob@ex.com")), AddOutcome::Added(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn existing_email_replaces_in_place_case_insensitively() {
        let mut store = TargetRowStore::new();
        store.add_target(&target("Ann", "ann@ex.com"));
        store.add_target(&target("Bob", "bob@ex.com"));
        let outcome = store.add_target(&target("Annie", "ANN@EX.COM"));
        assert_eq!(outcome, AddOutcome::Replaced(0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.rows()[0].first_name, "Annie");
        assert_eq!(store.rows()[0].email, "ann@ex.com");
        assert_eq!(store.rows()[1].first_name, "Bob");
    }

    #[test]
    fn loaded_mixed_case_email_is_still_matched() {
        let mut store = TargetRowStore::new();
        store.load(&[target("Ann", "Ann@Ex.com")]);
        assert_eq!(store.rows()[0].email, "Ann@Ex.com");
        assert_eq!(store.add_target(&target("Ann", "ann@ex.com")), AddOutcome::Replaced(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rows_hold_escaped_text_and_serialize_back_to_raw() {
        let raw = Target {
            first_name: "Tom & Jerry".into(),
            last_name: "<b>".into(),
            email: "t&j@ex.com".into(),
            description: "\"quoted\" > 'single'".into(),
            ..Target::default()
        };
        let mut store = TargetRowStore::new();
        store.load(std::slice::from_ref(&raw));
        assert_eq!(store.rows()[0].first_name, "Tom &amp; Jerry");
        assert_eq!(store.rows()[0].last_name, "&lt;b&gt;");
        assert_eq!(store.to_targets(), vec![raw]);
    }

    #[test]
    fn merge_counts_only_new_rows() {
        let mut store = TargetRowStore::new();
        store.add_target(&target("Ann", "ann@ex.com"));
        let imported = vec![target("A", "ANN@ex.com"), target("C", "cy@ex.com"), target("D", "di@ex.com")];
        assert_eq!(store.merge(&imported), 2);
        assert_eq!(store.len(), 3);
        assert_eq!(store.rows()[0].first_name, "A");
    }

    #[test]
    fn remove_and_clear() {
        let mut store = TargetRowStore::new();
        store.add_target(&target("Ann", "ann@ex.com"));
        store.add_target(&target("Bob", "bob@ex.com"));
        assert_eq!(store.remove(0).map(|r| r.first_name), Some("Ann".to_string()));
        assert!(store.remove(5).is_none());
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn entry_form_requires_a_plausible_email() {
        assert_eq!(validate_entry(&target("Ann", "  ")), Err(FormError::MissingEmail));
        assert!(matches!(validate_entry(&target("Ann", "ann")), Err(FormError::InvalidEmail(_))));
        assert!(matches!(validate_entry(&target("Ann", "ann@")), Err(FormError::InvalidEmail(_))));
        assert!(matches!(validate_entry(&target("Ann", "a b@ex.com")), Err(FormError::InvalidEmail(_))));
        assert!(validate_entry(&target("Ann", "ann@ex.com")).is_ok());
    }
}

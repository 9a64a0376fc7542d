//! Writable contact state and pending change-sets.

use crate::format::EntityAttrs;

/// The full writable state of a contact.
///
/// Used as the payload of a create, and as the result of applying a
/// [`ContactChanges`] over a contact's current state for an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactAttrs {
    pub name_prefix: Option<String>,
    pub given_name: Option<String>,
    pub additional_name: Option<String>,
    pub family_name: Option<String>,
    pub name_suffix: Option<String>,
    /// Notes.
    pub content: Option<String>,
    pub emails: Vec<EntityAttrs>,
    pub phone_numbers: Vec<EntityAttrs>,
    pub addresses: Vec<EntityAttrs>,
    pub organizations: Vec<EntityAttrs>,
    pub websites: Vec<EntityAttrs>,
    /// Hrefs of groups the contact belongs to.
    pub group_memberships: Vec<String>,
    /// Hrefs of groups the contact was removed from.
    pub deleted_group_memberships: Vec<String>,
}

/// A partial update. Unset fields keep their current value; the last
/// value set for a field wins.
///
/// Blank name parts and content are omitted from the emitted XML, so
/// setting one to `""` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChanges {
    pub name_prefix: Option<String>,
    pub given_name: Option<String>,
    pub additional_name: Option<String>,
    pub family_name: Option<String>,
    pub name_suffix: Option<String>,
    pub content: Option<String>,
    pub emails: Option<Vec<EntityAttrs>>,
    pub phone_numbers: Option<Vec<EntityAttrs>>,
    pub addresses: Option<Vec<EntityAttrs>>,
    pub organizations: Option<Vec<EntityAttrs>>,
    pub websites: Option<Vec<EntityAttrs>>,
    pub group_memberships: Option<Vec<String>>,
    pub deleted_group_memberships: Option<Vec<String>>,
}

macro_rules! change_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        impl ContactChanges {
            $(
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}

change_setters! {
    name_prefix: String,
    given_name: String,
    additional_name: String,
    family_name: String,
    name_suffix: String,
    content: String,
    emails: Vec<EntityAttrs>,
    phone_numbers: Vec<EntityAttrs>,
    addresses: Vec<EntityAttrs>,
    organizations: Vec<EntityAttrs>,
    websites: Vec<EntityAttrs>,
    group_memberships: Vec<String>,
    deleted_group_memberships: Vec<String>,
}

impl ContactChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays `other`: fields set there replace ours, the rest are kept.
    pub fn merge(&mut self, other: ContactChanges) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.name_prefix, other.name_prefix);
        take(&mut self.given_name, other.given_name);
        take(&mut self.additional_name, other.additional_name);
        take(&mut self.family_name, other.family_name);
        take(&mut self.name_suffix, other.name_suffix);
        take(&mut self.content, other.content);
        take(&mut self.emails, other.emails);
        take(&mut self.phone_numbers, other.phone_numbers);
        take(&mut self.addresses, other.addresses);
        take(&mut self.organizations, other.organizations);
        take(&mut self.websites, other.websites);
        take(&mut self.group_memberships, other.group_memberships);
        take(
            &mut self.deleted_group_memberships,
            other.deleted_group_memberships,
        );
    }

    /// Applies the changes over `current`, field by field.
    pub fn apply_to(&self, current: ContactAttrs) -> ContactAttrs {
        fn pick<T: Clone>(change: &Option<T>, current: T) -> T {
            change.clone().unwrap_or(current)
        }
        fn pick_text(change: &Option<String>, current: Option<String>) -> Option<String> {
            change.clone().or(current)
        }
        ContactAttrs {
            name_prefix: pick_text(&self.name_prefix, current.name_prefix),
            given_name: pick_text(&self.given_name, current.given_name),
            additional_name: pick_text(&self.additional_name, current.additional_name),
            family_name: pick_text(&self.family_name, current.family_name),
            name_suffix: pick_text(&self.name_suffix, current.name_suffix),
            content: pick_text(&self.content, current.content),
            emails: pick(&self.emails, current.emails),
            phone_numbers: pick(&self.phone_numbers, current.phone_numbers),
            addresses: pick(&self.addresses, current.addresses),
            organizations: pick(&self.organizations, current.organizations),
            websites: pick(&self.websites, current.websites),
            group_memberships: pick(&self.group_memberships, current.group_memberships),
            deleted_group_memberships: pick(
                &self.deleted_group_memberships,
                current.deleted_group_memberships,
            ),
        }
    }
}

/// Payload for creating a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttrs {
    pub title: String,
}

impl GroupAttrs {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_last_write_per_field() {
        let mut changes = ContactChanges::new().given_name("John").family_name("Doe");
        changes.merge(ContactChanges::new().given_name("Johnny"));
        assert_eq!(changes.given_name.as_deref(), Some("Johnny"));
        assert_eq!(changes.family_name.as_deref(), Some("Doe"));
        assert!(changes.emails.is_none());
    }

    #[test]
    fn empty_changes() {
        assert!(ContactChanges::new().is_empty());
        assert!(!ContactChanges::new().content("notes").is_empty());
        assert!(!ContactChanges::new().emails(Vec::new()).is_empty());
    }

    #[test]
    fn apply_falls_back_to_current_state() {
        let current = ContactAttrs {
            given_name: Some("John".into()),
            family_name: Some("Doe".into()),
            emails: vec![EntityAttrs::email("john@example.com")],
            group_memberships: vec!["http://groups/1".into()],
            ..Default::default()
        };
        let changes = ContactChanges::new()
            .family_name("Smith")
            .emails(vec![EntityAttrs::email("john@smith.com")]);

        let applied = changes.apply_to(current);
        assert_eq!(applied.given_name.as_deref(), Some("John"));
        assert_eq!(applied.family_name.as_deref(), Some("Smith"));
        assert_eq!(applied.emails[0].get("address"), Some("john@smith.com"));
        assert_eq!(applied.group_memberships, vec!["http://groups/1".to_string()]);
    }
}

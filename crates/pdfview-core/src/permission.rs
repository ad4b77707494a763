//! Document permissions.

use bitflags::bitflags;

/// A single permission the host viewer may query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Permission {
    /// Printing the document.
    Print,
    /// Copying text and graphics out of the document.
    Copy,
    /// Modifying document contents.
    Modify,
    /// Adding or editing annotations.
    Annotate,
    /// Filling interactive form fields.
    FillForms,
}

bitflags! {
    /// The full permission set reported by the backend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        const PRINT = 1;
        const COPY = 1 << 1;
        const MODIFY = 1 << 2;
        const ANNOTATE = 1 << 3;
        const FILL_FORMS = 1 << 4;
    }
}

impl Permissions {
    /// Whether the set grants a single permission.
    pub fn allows(&self, permission: Permission) -> bool {
        self.contains(match permission {
            Permission::Print => Permissions::PRINT,
            Permission::Copy => Permissions::COPY,
            Permission::Modify => Permissions::MODIFY,
            Permission::Annotate => Permissions::ANNOTATE,
            Permission::FillForms => Permissions::FILL_FORMS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_maps_each_permission() {
        let perms = Permissions::PRINT | Permissions::COPY;
        assert!(perms.allows(Permission::Print));
        assert!(perms.allows(Permission::Copy));
        assert!(!perms.allows(Permission::Modify));
        assert!(!perms.allows(Permission::Annotate));
        assert!(!perms.allows(Permission::FillForms));
    }

    #[test]
    fn all_grants_everything() {
        let perms = Permissions::all();
        for p in [
            Permission::Print,
            Permission::Copy,
            Permission::Modify,
            Permission::Annotate,
            Permission::FillForms,
        ] {
            assert!(perms.allows(p));
        }
    }
}

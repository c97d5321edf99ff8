/// Roles as encoded in the `role` claim of tokens issued by the identity service.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Admin and HR see every employee's attendance and leave.
    pub fn is_back_office(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

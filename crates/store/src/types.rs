use serde::Serialize;

/// A registered bot user, keyed by channel address (`whatsapp:+…`).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub phone_number: String,
    /// Name of the team the user belongs to, if any. May dangle if the team
    /// was renamed or deleted out from under us; read paths tolerate that.
    pub group_name: Option<String>,
    pub is_admin: bool,
}

/// A team (a.k.a. group): a named collection of users sharing a subscription
/// and an admin-curated schedule. Owned by an external billing process; the
/// core reads status and plan, and validates join codes.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub name: String,
    pub join_code: Option<String>,
    /// `active` / `trialing` allow access; any other non-null value means
    /// suspended. NULL is the new-team default and allows.
    pub subscription_status: Option<String>,
    pub plan_name: Option<String>,
}

/// One append-only schedule update row.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleUpdate {
    pub id: i64,
    pub group_name: String,
    pub content: String,
    pub created_by: String,
    pub created_at: i64,
}

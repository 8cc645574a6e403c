//! Connection settings for a SQL Anywhere server

/// Server, database and credentials used to connect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionData {
    /// Name of the SQL Anywhere server
    pub server_name: String,
    pub database_name: String,
    pub login_id: String,
    pub password: String,
}

impl ConnectionData {
    pub fn new(
        server_name: impl Into<String>,
        database_name: impl Into<String>,
        login_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            database_name: database_name.into(),
            login_id: login_id.into(),
            password: password.into(),
        }
    }

    /// Server, database and login must be present. The password may be empty.
    pub fn validate(&self) -> bool {
        !self.server_name.trim().is_empty()
            && !self.database_name.trim().is_empty()
            && !self.login_id.trim().is_empty()
    }

    pub fn connection_string(&self) -> String {
        format!(
            "UserID={};Password={};DatabaseName={};ServerName={};CommLinks=TCPIP()",
            escape_separator(&self.login_id),
            escape_separator(&self.password),
            self.database_name,
            self.server_name
        )
    }
}

fn escape_separator(value: &str) -> String {
    value.replace(';', "';'")
}

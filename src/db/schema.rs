//! SQL DDL for the site's four tables, plus the default settings the
//! bootstrap pass seeds.
//!
//! Every statement is independently idempotent (`CREATE TABLE IF NOT
//! EXISTS`), so the bootstrap can re-run at any time.

pub const CREATE_PROJECTS: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INT AUTO_INCREMENT PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    category VARCHAR(100) DEFAULT 'website',
    description TEXT NOT NULL,
    technologies TEXT,
    client VARCHAR(255),
    project_date DATE,
    project_url VARCHAR(500),
    image_url VARCHAR(500),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
    is_active BOOLEAN DEFAULT TRUE,
    INDEX idx_active (is_active),
    INDEX idx_created (created_at)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE utf8mb4_unicode_ci
"#;

pub const CREATE_PROJECT_REQUESTS: &str = r#"
CREATE TABLE IF NOT EXISTS project_requests (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    project_type VARCHAR(100) DEFAULT 'website',
    description TEXT NOT NULL,
    status VARCHAR(50) DEFAULT 'new',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
    INDEX idx_status (status),
    INDEX idx_created (created_at)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE utf8mb4_unicode_ci
"#;

pub const CREATE_ADMIN_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS admin_users (
    id INT AUTO_INCREMENT PRIMARY KEY,
    username VARCHAR(100) UNIQUE NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255),
    email VARCHAR(255),
    role VARCHAR(50) DEFAULT 'admin',
    last_login TIMESTAMP NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    is_active BOOLEAN DEFAULT TRUE,
    INDEX idx_username (username),
    INDEX idx_active (is_active)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE utf8mb4_unicode_ci
"#;

pub const CREATE_SETTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    id INT AUTO_INCREMENT PRIMARY KEY,
    setting_key VARCHAR(100) UNIQUE NOT NULL,
    setting_value TEXT,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
    INDEX idx_key (setting_key)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE utf8mb4_unicode_ci
"#;

/// Expected tables paired with their DDL, in creation order.
pub const TABLES: [(&str, &str); 4] = [
    ("projects", CREATE_PROJECTS),
    ("project_requests", CREATE_PROJECT_REQUESTS),
    ("admin_users", CREATE_ADMIN_USERS),
    ("settings", CREATE_SETTINGS),
];

/// Settings guaranteed to exist after a bootstrap or repair pass. Missing
/// keys are inserted with these values; existing rows are never touched.
pub const DEFAULT_SETTINGS: [(&str, &str); 8] = [
    ("site_title", "Atelier"),
    ("site_description", "Design and engineering studio"),
    ("admin_email", "admin@example.com"),
    ("contact_email", "hello@example.com"),
    ("contact_phone", ""),
    ("contact_address", ""),
    ("maintenance_mode", "disabled"),
    (
        "maintenance_message",
        "We are making some improvements to the site and will be back shortly.",
    ),
];

/// Default value for a known setting key, used when the database cannot be
/// reached and a handler still needs something sensible to return.
pub fn default_setting(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_statement_is_idempotent() {
        for (name, ddl) in TABLES {
            assert!(
                ddl.contains("CREATE TABLE IF NOT EXISTS"),
                "{name} DDL is not guarded"
            );
            assert!(ddl.contains(name), "{name} DDL names the wrong table");
        }
    }

    #[test]
    fn maintenance_defaults_are_present() {
        assert_eq!(default_setting("maintenance_mode"), Some("disabled"));
        assert!(default_setting("maintenance_message").is_some());
        assert_eq!(default_setting("no_such_key"), None);
    }
}

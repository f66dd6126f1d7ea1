//! Default users and Zoom accounts for a fresh install.

use crate::config::ZoomAccountSeed;
use crate::store::Repositories;
use helpdesk_shared::{DeskResult, Role, User};
use tracing::info;

/// One user per role, with stable ids the CLI can use out of the box
pub fn default_users() -> Vec<User> {
    vec![
        User::new("user-1", "Pegawai Demo", "pegawai@helpdesk.local", vec![Role::User])
            .with_unit("Bagian Umum"),
        User::new(
            "admin-1",
            "Admin Layanan",
            "admin@helpdesk.local",
            vec![Role::AdminLayanan],
        ),
        User::new("tech-1", "Teknisi Demo", "teknisi@helpdesk.local", vec![Role::Teknisi])
            .with_unit("Unit TI"),
        User::new(
            "supply-1",
            "Admin Penyedia",
            "penyedia@helpdesk.local",
            vec![Role::AdminPenyedia],
        ),
        User::new(
            "super-1",
            "Super Admin",
            "super@helpdesk.local",
            vec![Role::SuperAdmin, Role::AdminLayanan],
        ),
    ]
}

/// Fill empty user and account collections. Existing data is left alone.
pub fn seed_defaults(repos: &Repositories, accounts: &[ZoomAccountSeed]) -> DeskResult<()> {
    if repos.users.list()?.is_empty() {
        let users = default_users();
        info!("  Seeding {} default users", users.len());
        for user in users {
            repos.users.insert(user)?;
        }
    }
    if repos.zoom_accounts.list()?.is_empty() {
        info!("  Seeding {} Zoom accounts", accounts.len());
        for seed in accounts {
            repos.zoom_accounts.insert(seed.to_account())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_every_role_has_a_default_user() {
        let users = default_users();
        for role in [
            Role::User,
            Role::AdminLayanan,
            Role::Teknisi,
            Role::AdminPenyedia,
            Role::SuperAdmin,
        ] {
            assert!(users.iter().any(|u| u.has_role(role)), "{}", role);
        }
    }

    #[test]
    fn test_seed_is_idempotent() {
        let repos = Repositories::memory();
        let accounts = Config::default().zoom_accounts;
        seed_defaults(&repos, &accounts).unwrap();
        seed_defaults(&repos, &accounts).unwrap();
        assert_eq!(repos.users.list().unwrap().len(), default_users().len());
        assert_eq!(repos.zoom_accounts.list().unwrap().len(), 3);
    }
}

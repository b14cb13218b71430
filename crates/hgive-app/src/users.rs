//! In-memory account table
//!
//! Seeded with one donor and one charity. Signups are added for the life of
//! the process; nothing here is persisted.

use hgive_core::{Badge, GiveResult, Role, SignupForm, User, ValidationError};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: User,
}

/// Email → account lookup used by the login page
#[derive(Debug)]
pub struct UserDirectory {
    accounts: RwLock<HashMap<String, Account>>,
}

impl UserDirectory {
    /// Directory with no accounts
    #[must_use]
    pub fn empty() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Directory holding the two demo accounts
    #[must_use]
    pub fn with_demo_accounts() -> Self {
        let directory = Self::empty();

        let mut donor = User::new("Alex Johnson", Role::Donor)
            .with_email("donor@example.com")
            .with_wallet("0.0.12345");
        donor.total_donated = Some(1250.50);
        donor.badges = vec![
            Badge::new("First Donation", "🌱"),
            Badge::new("Regular Giver", "🌟"),
            Badge::new("Education Supporter", "📚"),
        ];

        let mut charity = User::new("Global Relief Foundation", Role::Charity)
            .with_email("charity@example.com")
            .with_wallet("0.0.67890");
        charity.total_received = Some(45250.75);
        charity.causes = vec!["Disaster Relief".to_string(), "Healthcare".to_string()];

        directory.insert("password123", donor);
        directory.insert("password123", charity);
        directory
    }

    fn insert(&self, password: &str, user: User) {
        if let Some(email) = user.email.clone() {
            self.accounts.write().insert(
                email.to_ascii_lowercase(),
                Account {
                    password: password.to_string(),
                    user,
                },
            );
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Look up an account by email and password.
    pub fn email_login(&self, email: &str, password: &str) -> GiveResult<User> {
        let accounts = self.accounts.read();
        match accounts.get(&email.trim().to_ascii_lowercase()) {
            Some(account) if account.password == password => {
                debug!(email, "credentials accepted");
                Ok(account.user.clone())
            }
            _ => Err(ValidationError::InvalidCredentials.into()),
        }
    }

    /// Look up an account by its linked wallet.
    pub fn wallet_login(&self, wallet_id: &str) -> GiveResult<User> {
        let wallet_id = wallet_id.trim();
        self.accounts
            .read()
            .values()
            .find(|a| a.user.wallet_id.as_deref() == Some(wallet_id))
            .map(|a| a.user.clone())
            .ok_or_else(|| ValidationError::UnknownWallet(wallet_id.to_string()).into())
    }

    /// Validate a signup and register the new account.
    pub fn signup(&self, form: &SignupForm) -> GiveResult<User> {
        form.validate()?;

        let email = form.email.trim().to_ascii_lowercase();
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&email) {
            return Err(ValidationError::EmailTaken(email).into());
        }

        let mut user = User::new(form.name.trim(), form.role).with_email(email.clone());
        if let Some(wallet) = form.wallet_id.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
            user = user.with_wallet(wallet);
        }

        accounts.insert(
            email,
            Account {
                password: form.password.clone(),
                user: user.clone(),
            },
        );
        info!(user = %user.identity(), role = %user.role, "account created");
        Ok(user)
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::with_demo_accounts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgive_core::GiveError;

    fn form(email: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            email: email.to_string(),
            name: "Sam Lee".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            role: Role::Donor,
            wallet_id: None,
        }
    }

    #[test]
    fn demo_donor_logs_in_by_email_and_wallet() {
        let directory = UserDirectory::with_demo_accounts();
        let by_email = directory.email_login("donor@example.com", "password123").unwrap();
        let by_wallet = directory.wallet_login("0.0.12345").unwrap();
        assert_eq!(by_email, by_wallet);
        assert_eq!(by_email.role, Role::Donor);
        assert_eq!(by_email.total_donated, Some(1250.50));
    }

    #[test]
    fn wrong_password_rejected() {
        let directory = UserDirectory::with_demo_accounts();
        let err = directory.email_login("donor@example.com", "nope").unwrap_err();
        assert!(matches!(
            err,
            GiveError::Validation(ValidationError::InvalidCredentials)
        ));
    }

    #[test]
    fn unknown_wallet_rejected() {
        let directory = UserDirectory::with_demo_accounts();
        assert!(matches!(
            directory.wallet_login("0.0.999"),
            Err(GiveError::Validation(ValidationError::UnknownWallet(_)))
        ));
    }

    #[test]
    fn signup_registers_account() {
        let directory = UserDirectory::with_demo_accounts();
        let user = directory.signup(&form("sam@example.com", "pw", "pw")).unwrap();
        assert_eq!(user.total_donated, Some(0.0));
        assert_eq!(directory.len(), 3);
        assert_eq!(directory.email_login("SAM@example.com", "pw").unwrap(), user);
    }

    #[test]
    fn signup_rejects_mismatch_and_duplicates() {
        let directory = UserDirectory::with_demo_accounts();
        assert!(matches!(
            directory.signup(&form("x@example.com", "a", "b")),
            Err(GiveError::Validation(ValidationError::PasswordMismatch))
        ));
        assert!(matches!(
            directory.signup(&form("donor@example.com", "a", "a")),
            Err(GiveError::Validation(ValidationError::EmailTaken(_)))
        ));
    }
}

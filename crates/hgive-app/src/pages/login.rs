//! Login page: email login, wallet login and signup.
//!
//! Each successful action ends in [`Session::login`].

use crate::context::AppContext;
use crate::session::Session;
use hgive_core::{GiveResult, Role, SignupForm, User};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    Email,
    Wallet,
    Signup,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginView {
    pub methods: Vec<LoginMethod>,
    pub account_types: Vec<Role>,
}

pub fn render(_session: &Session) -> LoginView {
    LoginView {
        methods: vec![LoginMethod::Email, LoginMethod::Wallet, LoginMethod::Signup],
        account_types: vec![Role::Donor, Role::Charity],
    }
}

pub fn email_login(
    ctx: &AppContext,
    session: &mut Session,
    email: &str,
    password: &str,
) -> GiveResult<User> {
    let user = ctx.users.email_login(email, password)?;
    session.login(user.clone(), user.role);
    Ok(user)
}

pub fn wallet_login(ctx: &AppContext, session: &mut Session, wallet_id: &str) -> GiveResult<User> {
    let user = ctx.users.wallet_login(wallet_id)?;
    session.login(user.clone(), user.role);
    Ok(user)
}

/// Create the account and sign straight in
pub fn signup(ctx: &AppContext, session: &mut Session, form: &SignupForm) -> GiveResult<User> {
    let user = ctx.users.signup(form)?;
    session.login(user.clone(), form.role);
    Ok(user)
}

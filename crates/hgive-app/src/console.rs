//! Line-oriented console front end
//!
//! One command per line, first word is the verb:
//!
//! ```text
//! go explore_causes            login donor@example.com password123
//! donate 1 50 anon             proof 1 2 QmPhotos
//! create {"name": ...}         quit
//! ```
//!
//! Every command produces a JSON value. Failures are reported per command
//! and leave the session as it was.

use crate::context::AppContext;
use crate::pages::charity;
use crate::pages::donate::DonationRequest;
use crate::pages::donor::{self, CampaignFilter};
use crate::pages::explore::{self, DonationAmount, ExploreQuery};
use crate::pages::impact;
use crate::pages::login;
use crate::router::{nav_options, Page, Router};
use crate::session::{Session, SessionState};
use chrono::NaiveDate;
use hgive_core::{CampaignDraft, GiveError, LeaderboardSort, MilestoneStatus, SignupForm};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub const HELP: &str = "\
help                              list commands
pages                             pages available to this session
go <page>                         open a page
login <email> <password>          email login
wallet <wallet-id>                wallet login
signup <json>                     create an account and sign in
logout                            end the session
whoami                            current identity
dashboard [json filter]           donor dashboard with a campaign filter
donate <campaign> <amount> [anon] donate from the dashboard
verify <transaction-id>           check a transaction on the ledger
leaderboard [total|count]         supporters ranking
history                           your donation history
explore [json query]              explore causes
details <campaign>                open a cause and select it
give <10|25|50|100|amount>        donate to the selected cause
donations <from> <to>             charity donations between two dates
proof <campaign> <milestone> <ref> submit milestone proof
advance <campaign> <milestone> <status>
create <json>                     register a campaign
impact [campaign]                 impact report
report <campaign>                 anchor an impact report on the ledger
audit                             consistency check of the data files
quit                              leave";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Give(#[from] GiveError),

    #[error("could not encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Pages,
    Go(Page),
    Login { email: String, password: String },
    Wallet(String),
    Signup(SignupForm),
    Logout,
    WhoAmI,
    Dashboard(CampaignFilter),
    Donate(DonationRequest),
    Verify(String),
    Leaderboard(LeaderboardSort),
    History,
    Explore(ExploreQuery),
    Details(u64),
    Give(DonationAmount),
    Donations { from: NaiveDate, to: NaiveDate },
    Proof { campaign: u64, milestone: u64, proof: String },
    Advance { campaign: u64, milestone: u64, to: MilestoneStatus },
    Create(Box<CampaignDraft>),
    Impact(Option<u64>),
    Report(u64),
    Audit,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let cmd = match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "pages" => Command::Pages,
            "go" => {
                let page = rest
                    .parse()
                    .map_err(|e: crate::router::UnknownPage| CommandError::Usage(e.to_string()))?;
                Command::Go(page)
            }
            "login" => match args.as_slice() {
                [email, password] => Command::Login {
                    email: (*email).to_string(),
                    password: (*password).to_string(),
                },
                _ => return Err(usage("login <email> <password>")),
            },
            "wallet" => match args.as_slice() {
                [wallet] => Command::Wallet((*wallet).to_string()),
                _ => return Err(usage("wallet <wallet-id>")),
            },
            "signup" => Command::Signup(json_arg(rest, "signup <json>")?),
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "dashboard" => Command::Dashboard(optional_json(rest, "dashboard [json filter]")?),
            "donate" => {
                const USAGE: &str = "donate <campaign> <amount> [anon]";
                let (campaign, amount, anonymous) = match args.as_slice() {
                    [c, a] => (*c, *a, false),
                    [c, a, "anon"] => (*c, *a, true),
                    _ => return Err(usage(USAGE)),
                };
                let request = DonationRequest::new(parse_arg(campaign, USAGE)?, parse_arg(amount, USAGE)?);
                Command::Donate(if anonymous { request.anonymously() } else { request })
            }
            "verify" => match args.as_slice() {
                [tx] => Command::Verify((*tx).to_string()),
                _ => return Err(usage("verify <transaction-id>")),
            },
            "leaderboard" => Command::Leaderboard(match args.as_slice() {
                [] | ["total"] => LeaderboardSort::TotalDonated,
                ["count"] => LeaderboardSort::DonationsCount,
                _ => return Err(usage("leaderboard [total|count]")),
            }),
            "history" => Command::History,
            "explore" => Command::Explore(optional_json(rest, "explore [json query]")?),
            "details" => Command::Details(single_arg(&args, "details <campaign>")?),
            "give" => {
                const USAGE: &str = "give <10|25|50|100|amount>";
                let amount = match args.as_slice() {
                    ["10"] => DonationAmount::Ten,
                    ["25"] => DonationAmount::TwentyFive,
                    ["50"] => DonationAmount::Fifty,
                    ["100"] => DonationAmount::Hundred,
                    [custom] => DonationAmount::Custom(parse_arg(custom, USAGE)?),
                    _ => return Err(usage(USAGE)),
                };
                Command::Give(amount)
            }
            "donations" => {
                const USAGE: &str = "donations <YYYY-MM-DD> <YYYY-MM-DD>";
                match args.as_slice() {
                    [from, to] => Command::Donations {
                        from: parse_arg(from, USAGE)?,
                        to: parse_arg(to, USAGE)?,
                    },
                    _ => return Err(usage(USAGE)),
                }
            }
            "proof" => {
                const USAGE: &str = "proof <campaign> <milestone> <reference>";
                let mut parts = rest.splitn(3, char::is_whitespace);
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(c), Some(m), Some(proof)) if !proof.trim().is_empty() => Command::Proof {
                        campaign: parse_arg(c, USAGE)?,
                        milestone: parse_arg(m, USAGE)?,
                        proof: proof.trim().to_string(),
                    },
                    _ => return Err(usage(USAGE)),
                }
            }
            "advance" => {
                const USAGE: &str = "advance <campaign> <milestone> <in_progress|completed>";
                match args.as_slice() {
                    [c, m, status] => Command::Advance {
                        campaign: parse_arg(c, USAGE)?,
                        milestone: parse_arg(m, USAGE)?,
                        to: serde_json::from_value(Value::String((*status).to_string()))
                            .map_err(|_| usage(USAGE))?,
                    },
                    _ => return Err(usage(USAGE)),
                }
            }
            "create" => Command::Create(Box::new(json_arg(rest, "create <json campaign draft>")?)),
            "impact" => Command::Impact(match args.as_slice() {
                [] => None,
                [id] => Some(parse_arg(id, "impact [campaign]")?),
                _ => return Err(usage("impact [campaign]")),
            }),
            "report" => Command::Report(single_arg(&args, "report <campaign>")?),
            "audit" => Command::Audit,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(cmd)
    }
}

fn usage(text: &str) -> CommandError {
    CommandError::Usage(text.to_string())
}

fn parse_arg<T: FromStr>(arg: &str, text: &str) -> Result<T, CommandError> {
    arg.parse().map_err(|_| usage(text))
}

fn single_arg<T: FromStr>(args: &[&str], text: &str) -> Result<T, CommandError> {
    match args {
        [arg] => parse_arg(arg, text),
        _ => Err(usage(text)),
    }
}

fn json_arg<T: DeserializeOwned>(rest: &str, text: &str) -> Result<T, CommandError> {
    serde_json::from_str(rest).map_err(|e| CommandError::Usage(format!("{text} ({e})")))
}

fn optional_json<T: DeserializeOwned + Default>(rest: &str, text: &str) -> Result<T, CommandError> {
    if rest.is_empty() {
        Ok(T::default())
    } else {
        json_arg(rest, text)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, CommandError> {
    Ok(serde_json::to_value(value)?)
}

/// One viewer's console: a router plus that viewer's session
#[derive(Debug)]
pub struct Console {
    router: Router,
    session: Session,
}

impl Console {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            router: Router::new(ctx),
            session: Session::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parse and run one line
    pub async fn run_line(&mut self, line: &str, today: NaiveDate) -> Result<Value, CommandError> {
        let command: Command = line.parse()?;
        self.execute(command, today).await
    }

    /// Run a parsed command. `Quit` is left to the caller and yields `null`.
    pub async fn execute(&mut self, command: Command, today: NaiveDate) -> Result<Value, CommandError> {
        debug!(?command, "console command");
        let ctx = Arc::clone(self.router.context());
        let ctx = ctx.as_ref();
        let session = &mut self.session;

        match command {
            Command::Help => Ok(Value::String(HELP.to_string())),
            Command::Quit => Ok(Value::Null),
            Command::Pages => encode(&json!({
                "current": session.page(),
                "available": nav_options(session.current_role()),
            })),
            Command::Go(page) => encode(&self.router.navigate(session, page, today)?),
            Command::Login { email, password } => {
                encode(&login::email_login(ctx, session, &email, &password)?)
            }
            Command::Wallet(wallet) => encode(&login::wallet_login(ctx, session, &wallet)?),
            Command::Signup(form) => encode(&login::signup(ctx, session, &form)?),
            Command::Logout => {
                session.logout();
                encode(&self.router.refresh(session, today)?)
            }
            Command::WhoAmI => match session.state() {
                SessionState::Anonymous => Ok(json!({ "logged_in": false })),
                SessionState::Authenticated { user, role } => Ok(json!({
                    "logged_in": true,
                    "role": role,
                    "user": user,
                })),
            },
            Command::Dashboard(filter) => encode(&donor::render(
                ctx,
                session,
                &filter,
                LeaderboardSort::default(),
                today,
            )?),
            Command::Donate(request) => encode(&donor::donate(ctx, session, &request, today).await?),
            Command::Verify(tx) => encode(&donor::verify(ctx, session, &tx).await?),
            Command::Leaderboard(sort) => {
                session.require_login()?;
                encode(&donor::leaderboard(ctx, sort))
            }
            Command::History => {
                let name = session.require_login()?.name.clone();
                encode(&donor::history(ctx, &name))
            }
            Command::Explore(query) => encode(&explore::render(ctx, session, &query, today)?),
            Command::Details(id) => encode(&explore::details(ctx, session, id)?),
            Command::Give(amount) => {
                encode(&explore::donate_selected(ctx, session, amount, today).await?)
            }
            Command::Donations { from, to } => {
                encode(&charity::donations_between(ctx, session, from, to)?)
            }
            Command::Proof {
                campaign,
                milestone,
                proof,
            } => encode(&charity::submit_proof(ctx, session, campaign, milestone, &proof).await?),
            Command::Advance {
                campaign,
                milestone,
                to,
            } => encode(&charity::advance_milestone(
                ctx, session, campaign, milestone, to, today,
            )?),
            Command::Create(draft) => encode(&charity::create_campaign(ctx, session, &draft).await?),
            Command::Impact(selected) => {
                session.require_login()?;
                if let Some(id) = selected {
                    ctx.store.campaign(id)?;
                    session.select_campaign(Some(id));
                }
                encode(&self.router.navigate(session, Page::ImpactReports, today)?)
            }
            Command::Report(id) => encode(&impact::verify_report(ctx, session, id).await?),
            Command::Audit => encode(&ctx.store.audit()),
        }
    }
}

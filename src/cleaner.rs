use crate::api::{ApiError, MessageApi};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::delete::{DeleteError, DeleteEvent, DeleteReport, Deleter, Pacer};
use crate::prompt::{ask_optional, ask_required, confirm, Console};
use crate::search::{collect_message_ids, SearchQuery, SearchScope};
use crate::snowflake::{MessageId, Snowflake};
use anyhow::Context as _;
use humantime::format_duration;
use std::io;
use tracing::{info, warn};

/// Everything gathered from the operator before any request is made.
#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub credentials: Credentials,
    pub query: SearchQuery,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Required input was missing or malformed.
    Aborted,
    NothingFound,
    Declined,
    Completed(DeleteReport),
    Halted {
        report: DeleteReport,
        error: DeleteError,
    },
}

/// Full interactive run: collect, search, confirm, delete, report.
///
/// `connect` builds the API client once credentials are known.
pub async fn run<A, F>(
    console: &mut dyn Console,
    pacer: &dyn Pacer,
    config: &Config,
    connect: F,
) -> anyhow::Result<RunOutcome>
where
    A: MessageApi,
    F: FnOnce(&Credentials) -> Result<A, ApiError>,
{
    let Some(request) = collect_request(console)? else {
        return Ok(RunOutcome::Aborted);
    };
    let api = connect(&request.credentials).context("Failed to set up the HTTP client")?;
    run_cleanup(console, &api, pacer, config, &request.query).await
}

pub fn collect_request(console: &mut dyn Console) -> io::Result<Option<CleanRequest>> {
    let Some(cookie) = ask_required(
        console,
        "Insert your Discord cookie",
        "A Discord cookie is needed in order to delete messages.",
    )?
    else {
        return Ok(None);
    };

    let Some(authorization) = ask_required(
        console,
        "Insert your Discord \"Authorization\" header value",
        "A Discord authorization token is needed as well.",
    )?
    else {
        return Ok(None);
    };

    let Some(author_id) = ask_id(
        console,
        "Insert your Discord user ID",
        "Your Discord user ID is needed to find your messages.",
    )?
    else {
        return Ok(None);
    };

    let is_dm = confirm(console, "Is this a DM channel ID?")?;

    let scope = if is_dm {
        SearchScope::DirectMessage
    } else {
        let Some(guild_id) = ask_id(
            console,
            "Insert the Discord guild ID to delete messages from",
            "A guild ID is needed.",
        )?
        else {
            return Ok(None);
        };
        SearchScope::Guild(guild_id)
    };

    let (channel_prompt, channel_missing) = if is_dm {
        (
            "Insert the Discord DM channel ID to delete messages from",
            "A DM channel ID is needed.",
        )
    } else {
        (
            "Insert the guild's channel ID to delete messages from",
            "A guild channel ID is needed.",
        )
    };
    let Some(channel_id) = ask_id(console, channel_prompt, channel_missing)? else {
        return Ok(None);
    };

    let kind = if is_dm { "DM channel" } else { "guild" };
    let start_bound = match ask_optional(
        console,
        &format!(
            "(Optional) Insert the starting message ID when searching {} messages\n\
             This must be the ID of a message that you wrote.\n\
             (Leave blank to start from the most recent message)",
            kind
        ),
    )? {
        None => None,
        Some(raw) => match parse_id(console, &raw)? {
            Some(id) => Some(id),
            None => return Ok(None),
        },
    };

    let stop_bound = match ask_optional(
        console,
        &format!(
            "(Optional) Insert the stop message ID\n\
             It is the last message to look for when searching {} messages.\n\
             This also must be the ID of a message that you wrote.\n\
             (Leave blank to keep going until the oldest message)",
            kind
        ),
    )? {
        None => None,
        Some(raw) => match parse_id(console, &raw)? {
            Some(id) => Some(id),
            None => return Ok(None),
        },
    };

    if let (Some(start), Some(stop)) = (start_bound, stop_bound) {
        if stop > start {
            console.say("The stop message must be older than the starting message.")?;
            return Ok(None);
        }
    }

    Ok(Some(CleanRequest {
        credentials: Credentials {
            cookie,
            authorization,
        },
        query: SearchQuery {
            author_id,
            channel_id,
            scope,
            start_bound,
            stop_bound,
        },
    }))
}

/// Search, confirm and delete for an already collected query.
pub async fn run_cleanup<A: MessageApi + ?Sized>(
    console: &mut dyn Console,
    api: &A,
    pacer: &dyn Pacer,
    config: &Config,
    query: &SearchQuery,
) -> anyhow::Result<RunOutcome> {
    let place = describe_place(query);
    console.say(&format!("Searching your messages in {}...", place))?;

    let message_ids = collect_message_ids(api, query)
        .await
        .context("Failed to search messages")?;
    if message_ids.is_empty() {
        console.say(&format!("No messages found in {}", place))?;
        return Ok(RunOutcome::NothingFound);
    }

    console.say(&format!(
        "Found {} messages in {}{}",
        message_ids.len(),
        place,
        describe_span(&message_ids)
    ))?;

    if !confirm(console, "Are you sure you want to delete them?")? {
        console.say("Quitting...")?;
        return Ok(RunOutcome::Declined);
    }

    info!("Deleting {} messages in {}", message_ids.len(), place);
    let deleter = Deleter::new(
        api,
        pacer,
        query.channel_id,
        config.deletion_delay,
        config.rate_limit_buffer,
    );
    let (report, error) = deleter
        .delete_all(&message_ids, &mut |event| {
            if let Err(e) = console.say(&describe_event(&event)) {
                warn!("Failed to write deletion progress: {}", e);
            }
        })
        .await;

    match error {
        Some(error) => {
            console.say(&error.to_string())?;
            console.say(&format!(
                "Stopped after deleting {} of {} messages.",
                report.deleted, report.requested
            ))?;
            Ok(RunOutcome::Halted { report, error })
        }
        None => {
            console.say(&format!("Deleted {} messages successfully!", report.deleted))?;
            Ok(RunOutcome::Completed(report))
        }
    }
}

fn ask_id(
    console: &mut dyn Console,
    prompt: &str,
    missing: &str,
) -> io::Result<Option<Snowflake>> {
    match ask_required(console, prompt, missing)? {
        Some(raw) => parse_id(console, &raw),
        None => Ok(None),
    }
}

fn parse_id(console: &mut dyn Console, raw: &str) -> io::Result<Option<Snowflake>> {
    match raw.parse::<Snowflake>() {
        Ok(id) => Ok(Some(id)),
        Err(e) => {
            console.say(&format!("That is not a valid Discord ID: {}", e))?;
            Ok(None)
        }
    }
}

fn describe_place(query: &SearchQuery) -> String {
    match query.scope {
        SearchScope::DirectMessage => format!("DM channel ({})", query.channel_id),
        SearchScope::Guild(guild_id) => {
            format!("guild ({}) channel ({})", guild_id, query.channel_id)
        }
    }
}

/// Date range covered by the IDs, which arrive newest first.
fn describe_span(message_ids: &[MessageId]) -> String {
    match (message_ids.last(), message_ids.first()) {
        (Some(oldest), Some(newest)) => format!(
            ", sent between {} and {}",
            oldest.created_at().format("%Y-%m-%d %H:%M UTC"),
            newest.created_at().format("%Y-%m-%d %H:%M UTC")
        ),
        _ => String::new(),
    }
}

fn describe_event(event: &DeleteEvent) -> String {
    match event {
        DeleteEvent::Deleting {
            position,
            total,
            message_id,
        } => format!("Deleting message ({}/{}): ({})", position, total, message_id),
        DeleteEvent::RateLimited { wait, .. } => format!(
            "The deletion rate limit was hit, retrying after {}...",
            format_duration(*wait)
        ),
        DeleteEvent::Deleted { message_id, pause } => format!(
            "Message ({}) deleted! Sleeping {}",
            message_id,
            format_duration(*pause)
        ),
    }
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};

use crate::client::models::{AnalysisList, OpenApiMode, SourceEntry, Sources};
use crate::commands::error::CommandError;
use crate::commands::session::Context;
use crate::config::core as store;
use crate::report::aggregate::aggregate;
use crate::report::render::render_report;
use crate::utils::table::{analyses_table, key_value_table};

/// Name inline `--source` code is submitted under.
pub const INLINE_SOURCE_NAME: &str = "cli-src.sol";

pub const REGISTERED_USERS_ONLY: &str = "This functionality is only available to registered users. \
Head over to https://mythx.io/ and register a free account to list your past analyses. \
Alternatively, you can look up the status of a specific job by calling 'mythx status <uuid>'.";

pub async fn login(ctx: &Context<'_>, out: &mut dyn Write) -> Result<()> {
    let stored = ctx.recover_credentials().await?;
    let credentials = ctx
        .service
        .login(&stored.username, &stored.password)
        .await?;
    tracing::debug!(
        "Access token {}\nRefresh token: {}",
        credentials.access,
        credentials.refresh
    );

    writeln!(out, "Successfully logged in as {}", credentials.username).into_diagnostic()?;
    ctx.persist(&credentials)
}

pub async fn logout(ctx: &Context<'_>, out: &mut dyn Write) -> Result<()> {
    let Some(credentials) = ctx.stored_credentials()? else {
        writeln!(out, "You are already logged out.").into_diagnostic()?;
        return Ok(());
    };

    store::remove(&ctx.settings.config_path)?;
    ctx.service.logout(&credentials).await?;
    writeln!(out, "Successfully logged out").into_diagnostic()?;
    Ok(())
}

pub async fn refresh(ctx: &Context<'_>, out: &mut dyn Write) -> Result<()> {
    let stored = ctx.recover_credentials().await?;
    let credentials = ctx.service.refresh(&stored).await?;
    tracing::debug!(
        "Access token {}\nRefresh token: {}",
        credentials.access,
        credentials.refresh
    );

    writeln!(
        out,
        "Successfully refreshed tokens for {}",
        credentials.username
    )
    .into_diagnostic()?;
    ctx.persist(&credentials)
}

pub async fn openapi(ctx: &Context<'_>, out: &mut dyn Write, mode: OpenApiMode) -> Result<()> {
    let document = ctx.service.openapi(mode).await?;
    writeln!(out, "{document}").into_diagnostic()
}

pub async fn version(ctx: &Context<'_>, out: &mut dyn Write) -> Result<()> {
    let info = ctx.service.version().await?;
    writeln!(out, "{}", key_value_table(info.fields())).into_diagnostic()
}

pub async fn status(ctx: &Context<'_>, out: &mut dyn Write, uuid: &str) -> Result<()> {
    let credentials = ctx.recover_credentials().await?;
    let resp = ctx.service.status(&credentials, uuid).await?;
    ctx.persist(&resp.credentials)?;

    writeln!(out, "{}", key_value_table(resp.data.fields())).into_diagnostic()
}

/// Fetch the `number` most recent analyses. `None` for trial users, who have
/// no listing to show.
pub async fn list_analyses(ctx: &Context<'_>, number: usize) -> Result<Option<AnalysisList>> {
    let credentials = ctx.recover_credentials().await?;
    if credentials.is_anonymous() {
        return Ok(None);
    }

    let resp = ctx.service.analysis_list(&credentials).await?;
    ctx.persist(&resp.credentials)?;

    let mut list = resp.data;
    list.analyses.truncate(number);
    Ok(Some(list))
}

pub async fn ps(ctx: &Context<'_>, out: &mut dyn Write, number: usize) -> Result<()> {
    let written = match list_analyses(ctx, number).await? {
        Some(list) => writeln!(out, "{}", analyses_table(&list.analyses)),
        None => writeln!(out, "{REGISTERED_USERS_ONLY}"),
    };
    written.into_diagnostic()
}

/// Inputs of `check`. File inputs replace their inline counterparts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckInput {
    pub bytecode: Option<String>,
    pub source: Option<String>,
    pub bytecode_file: Option<PathBuf>,
    pub source_file: Option<PathBuf>,
}

fn read_input(path: &Path) -> Result<String, CommandError> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_owned())
        .map_err(|source| CommandError::ReadInput {
            path: path.to_path_buf(),
            source,
        })
}

/// Resolve `input` into the bytecode and sources to submit.
pub fn collect_submission(input: &CheckInput) -> Result<(Option<String>, Sources), CommandError> {
    let mut bytecode = input.bytecode.clone().filter(|b| !b.is_empty());
    if let Some(path) = &input.bytecode_file {
        bytecode = Some(read_input(path)?);
    }

    let mut sources = Sources::new();
    if let Some(source) = input.source.clone().filter(|s| !s.is_empty()) {
        sources.insert(INLINE_SOURCE_NAME.to_owned(), SourceEntry { source });
    }
    if let Some(path) = &input.source_file {
        let source = read_input(path)?;
        let name = std::path::absolute(path).map_err(|source| CommandError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        sources = Sources::from([(name.display().to_string(), SourceEntry { source })]);
    }

    if bytecode.is_none() && sources.is_empty() {
        return Err(CommandError::NothingToSubmit);
    }
    Ok((bytecode, sources))
}

pub async fn check(ctx: &Context<'_>, out: &mut dyn Write, input: &CheckInput) -> Result<()> {
    let (bytecode, sources) = collect_submission(input)?;
    let credentials = ctx.recover_credentials().await?;

    let resp = ctx
        .service
        .analyze(&credentials, bytecode.as_deref(), &sources)
        .await?;
    ctx.persist(&resp.credentials)?;

    writeln!(out, "Analysis submitted as job {}", resp.data.uuid).into_diagnostic()
}

pub async fn report(ctx: &Context<'_>, out: &mut dyn Write, uuid: &str) -> Result<()> {
    let credentials = ctx.recover_credentials().await?;
    let resp = ctx.service.report(&credentials, uuid).await?;
    ctx.persist(&resp.credentials)?;

    let grouped = aggregate(&resp.data.reports)?;
    write!(out, "{}", render_report(&grouped)).into_diagnostic()
}

/// `value_parser` for UUID arguments: 8-4-4-4-12 hex digits.
pub fn parse_uuid(value: &str) -> Result<String, CommandError> {
    let groups: Vec<&str> = value.split('-').collect();
    let well_formed = groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(group, len)| group.len() == len && group.bytes().all(|b| b.is_ascii_hexdigit()));

    if well_formed {
        Ok(value.to_ascii_lowercase())
    } else {
        Err(CommandError::InvalidUuid(value.to_owned()))
    }
}

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use miette::{IntoDiagnostic, Result};
use tokio::time::MissedTickBehavior;

use crate::commands::core::{REGISTERED_USERS_ONLY, list_analyses};
use crate::commands::session::Context;
use crate::utils::table::analyses_table;

pub const TOP_LIMIT: usize = 20;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Redraw the most recent analyses every `interval` until `shutdown`
/// resolves. A failed refresh ends the loop with that error.
pub async fn top<S>(
    ctx: &Context<'_>,
    out: &mut dyn Write,
    interval: Duration,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let refresh_loop = async {
        loop {
            ticker.tick().await;
            let Some(list) = list_analyses(ctx, TOP_LIMIT).await? else {
                writeln!(out, "{REGISTERED_USERS_ONLY}").into_diagnostic()?;
                return Ok::<_, miette::Report>(());
            };
            writeln!(out, "{CLEAR_SCREEN}{}", analyses_table(&list.analyses)).into_diagnostic()?;
            out.flush().into_diagnostic()?;
        }
    };

    tokio::select! {
        biased;
        _ = shutdown => {
            tracing::debug!("top interrupted, shutting down");
            Ok(())
        }
        res = refresh_loop => res,
    }
}

use std::io::{self, BufRead, Write};

use miette::{IntoDiagnostic, Result};

use crate::client::core::AnalysisService;
use crate::config::core::{
    self as store, ANONYMOUS_ADDRESS, Credentials, TRIAL_PASSWORD, TokenRequirement,
};
use crate::config::settings::Settings;

/// Asks the user for a value, falling back to `default` on empty input.
pub trait Prompter {
    fn ask(&self, question: &str, default: &str) -> io::Result<String>;

    /// Like [`Self::ask`], but the answer is not echoed.
    fn ask_secret(&self, question: &str, default: &str) -> io::Result<String>;
}

fn or_default(answer: &str, default: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        default.to_owned()
    } else {
        answer.to_owned()
    }
}

pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&self, question: &str, default: &str) -> io::Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{question} [{default}]: ")?;
        stderr.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(or_default(&line, default))
    }

    fn ask_secret(&self, question: &str, default: &str) -> io::Result<String> {
        let answer = rpassword::prompt_password(format!("{question} [{default}]: "))?;
        Ok(or_default(&answer, default))
    }
}

/// What every command runs against.
pub struct Context<'a> {
    pub service: &'a dyn AnalysisService,
    pub settings: &'a Settings,
    pub prompter: &'a dyn Prompter,
}

impl Context<'_> {
    /// Load stored credentials, or log in and store them on first use.
    pub async fn recover_credentials(&self) -> Result<Credentials> {
        let path = &self.settings.config_path;
        if path.is_file() {
            return Ok(store::load(path, TokenRequirement::Required)?);
        }

        tracing::debug!(path = %path.display(), "no credential file, assuming first use");
        let username = match &self.settings.username {
            Some(username) => username.clone(),
            None => self
                .prompter
                .ask("Please enter your Ethereum address", ANONYMOUS_ADDRESS)
                .into_diagnostic()?,
        };
        let password = match &self.settings.password {
            Some(password) => password.clone(),
            None => self
                .prompter
                .ask_secret("Please enter your MythX password", TRIAL_PASSWORD)
                .into_diagnostic()?,
        };

        let credentials = self.service.login(&username, &password).await?;
        store::save(path, &credentials)?;
        Ok(credentials)
    }

    /// Like [`Self::recover_credentials`] but never prompts: `None` when no
    /// credential file exists.
    pub fn stored_credentials(&self) -> Result<Option<Credentials>> {
        let path = &self.settings.config_path;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(store::load(path, TokenRequirement::Required)?))
    }

    pub fn persist(&self, credentials: &Credentials) -> Result<()> {
        Ok(store::save(&self.settings.config_path, credentials)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::commands::testing::{FakeService, TempConfig};

    /// Remembers which questions were asked in the clear and which hidden.
    #[derive(Default)]
    struct RecordingPrompter {
        asked: Mutex<Vec<String>>,
    }

    impl Prompter for RecordingPrompter {
        fn ask(&self, question: &str, _default: &str) -> io::Result<String> {
            self.asked.lock().unwrap().push(format!("plain {question}"));
            Ok("0x1234567890123456789012345678901234567890".into())
        }

        fn ask_secret(&self, question: &str, _default: &str) -> io::Result<String> {
            self.asked.lock().unwrap().push(format!("hidden {question}"));
            Ok("hunter2".into())
        }
    }

    #[test]
    fn empty_answer_takes_the_default() {
        assert_eq!(or_default("\n", "trial"), "trial");
        assert_eq!(or_default("  pw \n", "trial"), "pw");
    }

    #[tokio::test]
    async fn password_is_read_without_echo() {
        let config = TempConfig::new("hidden-password");
        let settings = config.settings();
        let service = FakeService::default();
        let prompter = RecordingPrompter::default();
        let ctx = Context {
            service: &service,
            settings: &settings,
            prompter: &prompter,
        };

        let credentials = ctx.recover_credentials().await.unwrap();

        assert_eq!(
            *prompter.asked.lock().unwrap(),
            vec![
                "plain Please enter your Ethereum address".to_owned(),
                "hidden Please enter your MythX password".to_owned(),
            ]
        );
        assert_eq!(credentials.password, "hunter2");
        assert_eq!(config.stored().password, "hunter2");
    }
}

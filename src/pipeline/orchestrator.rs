//! Pipeline orchestrator.
//!
//! Runs every stage for one user, in order, best effort:
//! 1. Configuration load
//! 2. Payment-card retrieval
//! 3. User profile load
//! 4. Financial instruments load
//! 5. Identity lookup (sanitized and shown on the console)
//! 6. Display sanitization of the profile
//! 7. Instrument localization
//! 8. Submission
//!
//! A failed stage leaves its slot in the `UserContext` empty and the run
//! carries on. Only the submission status decides whether the run succeeded.

use std::fmt;

use serde::Serialize;

use crate::classification::{ClassifiedValue, MessageBuilder};
use crate::collaborators::{Collaborator, Console, SUBMIT_OK, SUBMIT_SECURITY_REJECTION};
use crate::error::PipelineError;
use crate::events::EventRouter;
use crate::logging::LogContext;
use crate::security::scrub::sanitize_identity;
use crate::validation::check_presence;

use super::context::{PipelineSettings, UserContext};
use super::retrieval::{
    load_configuration, load_financial_instruments, load_user_profile, lookup_identity,
    retrieve_card_data,
};
use super::submission::{post_information, SubmissionInput};
use super::transform::{localize_instruments, sanitize_for_display};

/// Where a run is in the stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Start,
    ConfigLoaded,
    CardRetrieved,
    ProfileLoaded,
    InstrumentsLoaded,
    Sanitized,
    Localized,
    Posted,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Start => "START",
            PipelineState::ConfigLoaded => "CONFIG_LOADED",
            PipelineState::CardRetrieved => "CARD_RETRIEVED",
            PipelineState::ProfileLoaded => "PROFILE_LOADED",
            PipelineState::InstrumentsLoaded => "INSTRUMENTS_LOADED",
            PipelineState::Sanitized => "SANITIZED",
            PipelineState::Localized => "LOCALIZED",
            PipelineState::Posted => "POSTED",
            PipelineState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Posted | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether one stage produced its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: &'static str,
    pub succeeded: bool,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub state: PipelineState,
    /// Submission status; `None` when the run never reached submission.
    pub status: Option<i32>,
    pub stages: Vec<StageOutcome>,
    /// States entered, in order, starting with `Start`.
    pub transitions: Vec<PipelineState>,
}

impl RunReport {
    fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            state: PipelineState::Start,
            status: None,
            stages: Vec::new(),
            transitions: vec![PipelineState::Start],
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == PipelineState::Posted
    }

    /// Record a stage result; a stage that produced output advances the state.
    fn record(&mut self, stage: &'static str, succeeded: bool, reached: PipelineState) {
        self.stages.push(StageOutcome { stage, succeeded });
        if succeeded {
            self.enter(reached);
        }
    }

    fn enter(&mut self, state: PipelineState) {
        self.state = state;
        self.transitions.push(state);
    }
}

/// One user-processing pipeline over a set of collaborators.
///
/// Holds only shared borrows, so independent runs may execute concurrently
/// against the same collaborator.
pub struct Pipeline<'a, C: Collaborator> {
    collab: &'a C,
    console: &'a dyn Console,
    settings: &'a PipelineSettings,
}

impl<'a, C: Collaborator> Pipeline<'a, C> {
    pub fn new(collab: &'a C, console: &'a dyn Console, settings: &'a PipelineSettings) -> Self {
        Self {
            collab,
            console,
            settings,
        }
    }

    fn router(&self, ctx: LogContext) -> EventRouter<'a> {
        EventRouter::new(self.collab, self.collab, self.console, ctx)
    }

    /// Entry point for command-line invocation.
    ///
    /// Exactly one non-empty user id is accepted. Anything else is a security
    /// event followed by an audit failure, and no stage runs.
    pub fn run_for_args(&self, args: &[String]) -> RunReport {
        match args {
            [user_id] => self.run(user_id),
            _ => self.reject_invocation(args.len()),
        }
    }

    /// Record a malformed invocation: a security event, then an audit failure.
    pub fn reject_invocation(&self, arg_count: usize) -> RunReport {
        let ctx = LogContext::for_new_run();
        let router = self.router(ctx.clone());

        log::warn!("{} INVALID_INVOCATION args={}", ctx, arg_count);

        router.security(ClassifiedValue::plaintext(
            "unexpected execution of middleware application with invalid parameters".to_string(),
        ));
        let reason = ClassifiedValue::plaintext(PipelineError::InvalidArguments.to_string());
        router.audit(
            MessageBuilder::new("user processing failed unexpectedly: ")
                .value(&reason)
                .build(),
        );

        let mut report = RunReport::new(&ctx.run_id);
        report.enter(PipelineState::Failed);
        report
    }

    /// Process one user end to end.
    ///
    /// An empty user id is rejected like a malformed invocation, before any
    /// stage runs.
    pub fn run(&self, user_id: &str) -> RunReport {
        if !check_presence(Some(user_id)).passed {
            return self.reject_invocation(1);
        }

        let ctx = LogContext::for_new_run();
        let router = self.router(ctx.clone());
        let mut report = RunReport::new(&ctx.run_id);
        let mut user = UserContext::new(user_id);

        log::info!("{} RUN_START", ctx);
        router.audit(ClassifiedValue::plaintext("user processing initiated".to_string()));

        user.config = load_configuration(self.collab, &router);
        report.record("config_load", user.config.is_some(), PipelineState::ConfigLoaded);

        user.card = retrieve_card_data(self.collab, &router, &user.user_id, &self.settings.vault_key);
        report.record("card_retrieval", user.card.is_some(), PipelineState::CardRetrieved);

        user.profile = load_user_profile(self.collab, &router, &user.user_id);
        report.record("profile_load", user.profile.is_some(), PipelineState::ProfileLoaded);

        user.instruments = load_financial_instruments(
            self.collab,
            &router,
            &user.user_id,
            &self.settings.gateway_name,
            self.settings.gateway_port,
        );
        report.record(
            "instruments_load",
            user.instruments.is_some(),
            PipelineState::InstrumentsLoaded,
        );

        user.identity = lookup_identity(&router, &user.user_id);
        if let Some(identity) = &user.identity {
            router.display(&sanitize_identity(self.collab, identity));
        }
        report.stages.push(StageOutcome {
            stage: "identity_lookup",
            succeeded: user.identity.is_some(),
        });

        user.display_profile = sanitize_for_display(&router, user.profile.as_deref());
        report.record(
            "display_sanitize",
            user.display_profile.is_some(),
            PipelineState::Sanitized,
        );

        user.localized = localize_instruments(self.collab, &router, user.instruments.as_deref());
        report.record("localize", user.localized.is_some(), PipelineState::Localized);

        let host = user.config.as_ref().map(|c| c.host_descriptor());
        let status = post_information(
            self.collab,
            &router,
            SubmissionInput {
                host: host.as_deref(),
                user_id: Some(&user.user_id),
                profile: user.display_profile.as_ref(),
                card: user.card.as_ref(),
                instruments: user.localized.as_ref(),
            },
        );
        report.stages.push(StageOutcome {
            stage: "submission",
            succeeded: status == SUBMIT_OK,
        });
        report.status = Some(status);

        self.finish(&router, &mut report, status);
        report
    }

    fn finish(&self, router: &EventRouter<'_>, report: &mut RunReport, status: i32) {
        if status == SUBMIT_OK {
            report.enter(PipelineState::Posted);
            router.audit(ClassifiedValue::plaintext(
                "user processing terminated with no problems".to_string(),
            ));
        } else {
            report.enter(PipelineState::Failed);
            if status == SUBMIT_SECURITY_REJECTION {
                router.security(ClassifiedValue::plaintext(
                    "user processing failed due to security issue".to_string(),
                ));
            }
            router.programmer_error(PipelineError::UnexpectedPostFailure(status));
            router.audit(ClassifiedValue::plaintext(
                "user processing failed unexpectedly".to_string(),
            ));
        }

        log::info!(
            "{} RUN_COMPLETE state={} status={} stages_ok={}/{}",
            router.context(),
            report.state,
            status,
            report.stages.iter().filter(|s| s.succeeded).count(),
            report.stages.len()
        );
    }
}

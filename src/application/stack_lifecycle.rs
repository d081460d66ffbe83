//! Stack lifecycle manager
//!
//! Owns every interaction with the stack provider: create, update, delete,
//! polling to a terminal status, and export lookup with bounded retry.

use tracing::{debug, info, warn};

use crate::domain::ports::{Clock, CreateOutcome, StackProvider, UpdateOutcome};
use crate::domain::value_objects::{CancellationFlag, PollPolicy, RetryPolicy, StackStatus};
use crate::error::{LiftoffError, LiftoffResult};

/// Result of a bounded export lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportLookup {
    Found(String),
    /// Export never appeared within the retry budget
    NotFound { attempts: u32 },
}

pub struct StackLifecycle<'a> {
    provider: &'a dyn StackProvider,
    clock: &'a dyn Clock,
    poll: PollPolicy,
    exports: RetryPolicy,
    cancel: CancellationFlag,
}

impl<'a> StackLifecycle<'a> {
    pub fn new(
        provider: &'a dyn StackProvider,
        clock: &'a dyn Clock,
        poll: PollPolicy,
        exports: RetryPolicy,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            provider,
            clock,
            poll,
            exports,
            cancel,
        }
    }

    /// Create the stack; an existing stack is reported, not treated as an error
    pub fn create_stack(&self, name: &str, template_body: &str) -> LiftoffResult<CreateOutcome> {
        let outcome = self
            .provider
            .create_stack(name, template_body)
            .map_err(|source| LiftoffError::StackRejected {
                operation: "create",
                stack: name.to_string(),
                source,
            })?;
        match outcome {
            CreateOutcome::Created => info!(stack = name, "creating stack"),
            CreateOutcome::AlreadyExists => {
                info!(stack = name, "stack already exists, proceeding to update")
            }
        }
        Ok(outcome)
    }

    /// Point the stack at a new template stored in the object store
    pub fn update_stack(&self, name: &str, template_url: &str) -> LiftoffResult<UpdateOutcome> {
        let outcome = self
            .provider
            .update_stack(name, template_url)
            .map_err(|source| LiftoffError::StackRejected {
                operation: "update",
                stack: name.to_string(),
                source,
            })?;
        if outcome == UpdateOutcome::NoChanges {
            info!(stack = name, "no updates to perform");
        }
        Ok(outcome)
    }

    pub fn delete_stack(&self, name: &str) -> LiftoffResult<()> {
        self.provider
            .delete_stack(name)
            .map_err(|source| LiftoffError::StackRejected {
                operation: "delete",
                stack: name.to_string(),
                source,
            })
    }

    pub fn status(&self, name: &str) -> LiftoffResult<StackStatus> {
        Ok(self.provider.stack_status(name)?)
    }

    /// Block until the stack reaches a terminal status.
    ///
    /// Failure terminals are errors. Exceeding the poll timeout yields
    /// `PollTimeout`; a raised cancellation flag yields `Cancelled`.
    pub fn poll_until_terminal(&self, name: &str) -> LiftoffResult<StackStatus> {
        let started = self.clock.now();
        loop {
            if self.cancel.is_cancelled() {
                return Err(LiftoffError::Cancelled);
            }

            let status = self.provider.stack_status(name)?;
            debug!(stack = name, %status, "polled stack status");

            if status.is_terminal() {
                if status.is_failure() {
                    return Err(LiftoffError::StackFailed {
                        stack: name.to_string(),
                        status,
                    });
                }
                return Ok(status);
            }

            let waited = self.clock.now().saturating_duration_since(started);
            if waited >= self.poll.timeout {
                return Err(LiftoffError::PollTimeout {
                    stack: name.to_string(),
                    waited,
                });
            }
            self.clock.sleep(self.poll.interval);
        }
    }

    /// Look up an export, retrying while it propagates.
    ///
    /// Makes exactly `attempts` listing passes before giving up. Provider
    /// errors count as a failed attempt. Only cancellation is an error.
    pub fn find_export(&self, export_name: &str) -> LiftoffResult<ExportLookup> {
        let attempts = self.exports.attempts;
        for attempt in 1..=attempts {
            if self.cancel.is_cancelled() {
                return Err(LiftoffError::Cancelled);
            }

            match self.scan_exports(export_name) {
                Ok(Some(value)) => {
                    debug!(export = export_name, attempt, "export resolved");
                    return Ok(ExportLookup::Found(value));
                }
                Ok(None) => debug!(export = export_name, attempt, "export not visible yet"),
                Err(err) => warn!(export = export_name, attempt, "export listing failed: {}", err),
            }

            if attempt < attempts {
                self.clock.sleep(self.exports.interval);
            }
        }
        warn!(export = export_name, attempts, "export not found");
        Ok(ExportLookup::NotFound { attempts })
    }

    fn scan_exports(
        &self,
        export_name: &str,
    ) -> Result<Option<String>, crate::domain::ports::ProviderError> {
        let mut token: Option<String> = None;
        loop {
            let page = self.provider.list_exports(token.as_deref())?;
            if let Some(export) = page.exports.into_iter().find(|e| e.name == export_name) {
                return Ok(Some(export.value));
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        ExportPage, ManualClock, ProviderError, ProviderResult, StackExport,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Provider that replays scripted statuses and export pages
    #[derive(Default)]
    struct ScriptedProvider {
        statuses: Mutex<VecDeque<StackStatus>>,
        export_pages: Mutex<VecDeque<ExportPage>>,
        list_calls: Mutex<u32>,
        create_result: Option<ProviderResult<CreateOutcome>>,
    }

    impl ScriptedProvider {
        fn with_statuses(statuses: &[&str]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().map(|s| StackStatus::parse(s)).collect()),
                ..Self::default()
            }
        }

        fn list_calls(&self) -> u32 {
            *self.list_calls.lock().unwrap()
        }
    }

    impl StackProvider for ScriptedProvider {
        fn create_stack(&self, _name: &str, _body: &str) -> ProviderResult<CreateOutcome> {
            self.create_result.clone().unwrap_or(Ok(CreateOutcome::Created))
        }

        fn update_stack(&self, _name: &str, _url: &str) -> ProviderResult<UpdateOutcome> {
            Ok(UpdateOutcome::Updating)
        }

        fn delete_stack(&self, _name: &str) -> ProviderResult<()> {
            Ok(())
        }

        fn stack_status(&self, _name: &str) -> ProviderResult<StackStatus> {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.pop_front().unwrap())
            } else {
                Ok(statuses.front().cloned().unwrap_or(StackStatus::Absent))
            }
        }

        fn list_exports(&self, _next: Option<&str>) -> ProviderResult<ExportPage> {
            *self.list_calls.lock().unwrap() += 1;
            Ok(self
                .export_pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }
    }

    fn lifecycle<'a>(
        provider: &'a ScriptedProvider,
        clock: &'a ManualClock,
        attempts: u32,
    ) -> StackLifecycle<'a> {
        StackLifecycle::new(
            provider,
            clock,
            PollPolicy {
                interval: Duration::from_secs(5),
                timeout: Duration::from_secs(60),
            },
            RetryPolicy::new(attempts, Duration::from_secs(3)),
            CancellationFlag::new(),
        )
    }

    #[test]
    fn poll_returns_first_successful_terminal() {
        let provider = ScriptedProvider::with_statuses(&[
            "CREATE_IN_PROGRESS",
            "CREATE_IN_PROGRESS",
            "CREATE_COMPLETE",
        ]);
        let clock = ManualClock::new();

        let status = lifecycle(&provider, &clock, 1)
            .poll_until_terminal("shop-dev")
            .unwrap();

        assert_eq!(status, StackStatus::CreateComplete);
        assert_eq!(clock.sleep_count(), 2);
    }

    #[test]
    fn poll_surfaces_failure_terminal() {
        let provider =
            ScriptedProvider::with_statuses(&["UPDATE_IN_PROGRESS", "UPDATE_ROLLBACK_COMPLETE"]);
        let clock = ManualClock::new();

        let err = lifecycle(&provider, &clock, 1)
            .poll_until_terminal("shop-dev")
            .unwrap_err();

        assert!(matches!(
            err,
            LiftoffError::StackFailed {
                status: StackStatus::UpdateRollbackComplete,
                ..
            }
        ));
    }

    #[test]
    fn poll_times_out_on_endless_progress() {
        let provider = ScriptedProvider::with_statuses(&["UPDATE_IN_PROGRESS"]);
        let clock = ManualClock::new();

        let err = lifecycle(&provider, &clock, 1)
            .poll_until_terminal("shop-dev")
            .unwrap_err();

        assert!(matches!(err, LiftoffError::PollTimeout { .. }));
        assert!(err.is_retryable());
        assert_eq!(clock.elapsed(), Duration::from_secs(60));
    }

    #[test]
    fn poll_stops_when_cancelled() {
        let provider = ScriptedProvider::with_statuses(&["UPDATE_IN_PROGRESS"]);
        let clock = ManualClock::new();
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let lifecycle = StackLifecycle::new(
            &provider,
            &clock,
            PollPolicy::default(),
            RetryPolicy::default(),
            cancel,
        );

        assert!(matches!(
            lifecycle.poll_until_terminal("shop-dev"),
            Err(LiftoffError::Cancelled)
        ));
    }

    #[test]
    fn delete_polls_to_absent() {
        let provider = ScriptedProvider::with_statuses(&["DELETE_IN_PROGRESS", "ABSENT"]);
        let clock = ManualClock::new();

        let status = lifecycle(&provider, &clock, 1)
            .poll_until_terminal("shop-dev")
            .unwrap();

        assert!(status.is_gone());
    }

    #[test]
    fn find_export_gives_up_after_one_attempt() {
        let provider = ScriptedProvider::default();
        let clock = ManualClock::new();

        let lookup = lifecycle(&provider, &clock, 1)
            .find_export("missing")
            .unwrap();

        assert_eq!(lookup, ExportLookup::NotFound { attempts: 1 });
        assert_eq!(provider.list_calls(), 1);
        assert_eq!(clock.sleep_count(), 0);
    }

    #[test]
    fn find_export_gives_up_after_three_attempts() {
        let provider = ScriptedProvider::default();
        let clock = ManualClock::new();

        let lookup = lifecycle(&provider, &clock, 3)
            .find_export("missing")
            .unwrap();

        assert_eq!(lookup, ExportLookup::NotFound { attempts: 3 });
        assert_eq!(provider.list_calls(), 3);
        assert_eq!(clock.elapsed(), Duration::from_secs(6));
    }

    #[test]
    fn find_export_walks_pages_and_retries() {
        let provider = ScriptedProvider::default();
        {
            let mut pages = provider.export_pages.lock().unwrap();
            // attempt 1: nothing
            pages.push_back(ExportPage::default());
            // attempt 2: two pages, export on the second
            pages.push_back(ExportPage {
                exports: vec![StackExport {
                    name: "other".to_string(),
                    value: "x".to_string(),
                }],
                next_token: Some("p2".to_string()),
            });
            pages.push_back(ExportPage {
                exports: vec![StackExport {
                    name: "shop-dev-DeploymentBucketName".to_string(),
                    value: "shop-dev-bucket".to_string(),
                }],
                next_token: None,
            });
        }
        let clock = ManualClock::new();

        let lookup = lifecycle(&provider, &clock, 5)
            .find_export("shop-dev-DeploymentBucketName")
            .unwrap();

        assert_eq!(lookup, ExportLookup::Found("shop-dev-bucket".to_string()));
        assert_eq!(provider.list_calls(), 3);
        assert_eq!(clock.sleep_count(), 1);
    }

    #[test]
    fn create_maps_rejection_to_fatal_error() {
        let provider = ScriptedProvider {
            create_result: Some(Err(ProviderError::Rejected("bad template".to_string()))),
            ..ScriptedProvider::default()
        };
        let clock = ManualClock::new();

        let err = lifecycle(&provider, &clock, 1)
            .create_stack("shop-dev", "{}")
            .unwrap_err();

        assert!(matches!(
            err,
            LiftoffError::StackRejected {
                operation: "create",
                ..
            }
        ));
    }

    #[test]
    fn create_reports_existing_stack() {
        let provider = ScriptedProvider {
            create_result: Some(Ok(CreateOutcome::AlreadyExists)),
            ..ScriptedProvider::default()
        };
        let clock = ManualClock::new();

        let outcome = lifecycle(&provider, &clock, 1)
            .create_stack("shop-dev", "{}")
            .unwrap();

        assert_eq!(outcome, CreateOutcome::AlreadyExists);
    }
}

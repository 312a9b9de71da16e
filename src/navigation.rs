use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

use crate::host::{CardId, PageHost, Scheduler};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const LOADING_CLASS: &str = "loading";
const PRESSED_TRANSFORM: &str = "scale(0.95)";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Opened { option: String, url: String },
    Unmapped { option: String },
    Failed { option: String, url: String, reason: String },
}

/// Delayed hand-off from a card activation to its destination.
pub struct NavigationGate {
    page: Rc<dyn PageHost>,
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    feedback: Duration,
    last_outcome: Rc<RefCell<Option<NavigationOutcome>>>,
}

impl NavigationGate {
    pub fn new(
        page: Rc<dyn PageHost>,
        scheduler: Rc<dyn Scheduler>,
        delay: Duration,
        feedback: Duration,
    ) -> Self {
        Self {
            page,
            scheduler,
            delay,
            feedback,
            last_outcome: Rc::new(RefCell::new(None)),
        }
    }

    /// Briefly shrink the card, then restore it.
    pub fn show_click_feedback(&self, card: CardId) {
        self.page.set_card_transform(card, PRESSED_TRANSFORM);
        let page = self.page.clone();
        self.scheduler.schedule(
            self.feedback,
            Box::new(move || page.set_card_transform(card, "")),
        );
    }

    /// Mark the page as loading and, after the feedback window, open the
    /// destination in a new browsing context. Each call schedules its own
    /// independent task.
    pub fn activate(&self, option: &str, destination: Option<&str>) {
        self.page.add_body_class(LOADING_CLASS);

        let page = self.page.clone();
        let last_outcome = self.last_outcome.clone();
        let option = option.to_string();
        let destination = destination.map(str::to_string);
        self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                let outcome = match destination {
                    Some(url) => match page.open_new_context(&url) {
                        Ok(()) => {
                            log_info!("Opened {url} for option {option}");
                            NavigationOutcome::Opened { option, url }
                        }
                        Err(err) => {
                            log_warn!("Could not open {url} for option {option}: {err:#}");
                            NavigationOutcome::Failed {
                                option,
                                url,
                                reason: format!("{err:#}"),
                            }
                        }
                    },
                    None => {
                        log_warn!("No destination defined for option: {option}");
                        NavigationOutcome::Unmapped { option }
                    }
                };
                *last_outcome.borrow_mut() = Some(outcome);
                page.remove_body_class(LOADING_CLASS);
            }),
        );
    }

    /// Result of the most recently completed navigation, if any.
    pub fn last_outcome(&self) -> Option<NavigationOutcome> {
        self.last_outcome.borrow().clone()
    }
}

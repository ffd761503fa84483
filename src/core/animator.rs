/// Timed character-by-character reveal of story text and choice lists.
///
/// At most one reveal is ever active. Starting a new reveal cancels the
/// in-flight one, and cancelling is the only way render state changes hands;
/// the pending and safety timer handles live inside the run and are mutated
/// nowhere else. A safety timer sized to the worst-case reveal duration plus
/// a fixed margin guarantees the session can never stay blocked forever.

use tracing::{debug, warn};

use crate::core::selection::{CHOICE_SEPARATOR, SELECTED_PREFIX, UNSELECTED_PREFIX};
use crate::core::surface::{Surface, SurfaceError};
use crate::core::timer::{TimerEvent, TimerFired, TimerHandle, TimerScheduler};

/// Milliseconds between revealed characters.
pub const DEFAULT_CHAR_DELAY_MS: u64 = 50;
/// Pause between a finished reveal and its completion directive.
pub const DEFAULT_COMPLETION_PAUSE_MS: u64 = 1000;
/// Fixed margin added to the worst-case reveal time for the safety timer.
pub const DEFAULT_SAFETY_MARGIN_MS: u64 = 5000;

#[derive(Debug)]
enum RevealContent {
    Story {
        chars: Vec<char>,
        pos: usize,
    },
    Choices {
        items: Vec<Vec<char>>,
        item: usize,
        ch: usize,
    },
}

#[derive(Debug)]
struct AnimationRun<D> {
    content: RevealContent,
    rendered: String,
    pending: Option<TimerHandle>,
    safety: Option<TimerHandle>,
    on_complete: Option<D>,
    awaiting_beat: bool,
}

/// What a delivered timer did to the active run.
#[derive(Debug)]
pub enum RunSignal<D> {
    /// No active run matched the timer; it was stale and ignored.
    Idle,
    /// The reveal advanced and is still running.
    Revealing,
    /// The reveal finished; the completion directive, if any, is handed back
    /// exactly once.
    Completed(Option<D>),
    /// The safety backstop expired before normal completion.
    SafetyExpired,
}

/// Drives one reveal at a time against a host scheduler and surface.
///
/// `D` is the completion directive the owner attached to the reveal; the
/// animator carries it as opaque data and hands it back when the reveal
/// (plus the completion beat) finishes.
#[derive(Debug)]
pub struct Animator<D> {
    run: Option<AnimationRun<D>>,
    char_delay_ms: u64,
    completion_pause_ms: u64,
    safety_margin_ms: u64,
}

impl<D> Default for Animator<D> {
    fn default() -> Animator<D> {
        Animator::new()
    }
}

impl<D> Animator<D> {
    pub fn new() -> Animator<D> {
        Animator::with_timings(
            DEFAULT_CHAR_DELAY_MS,
            DEFAULT_COMPLETION_PAUSE_MS,
            DEFAULT_SAFETY_MARGIN_MS,
        )
    }

    pub fn with_timings(
        char_delay_ms: u64,
        completion_pause_ms: u64,
        safety_margin_ms: u64,
    ) -> Animator<D> {
        Animator {
            run: None,
            char_delay_ms,
            completion_pause_ms,
            safety_margin_ms,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// The text revealed so far, if a run is active.
    pub fn visible_text(&self) -> Option<&str> {
        self.run.as_ref().map(|run| run.rendered.as_str())
    }

    /// Begin revealing `text` into the story pane, preempting any in-flight
    /// run. The prior run's completion directive is dropped, never fired.
    pub fn start_text_reveal(
        &mut self,
        text: &str,
        on_complete: Option<D>,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) -> Result<(), SurfaceError> {
        self.cancel(sched);
        surface.render_story("")?;
        let chars: Vec<char> = text.chars().collect();
        debug!(chars = chars.len(), "text reveal started");
        self.arm(RevealContent::Story { chars, pos: 0 }, on_complete, sched);
        Ok(())
    }

    /// Begin revealing a choice list into the choice pane, one choice at a
    /// time with the selection marker on the first entry.
    pub fn start_choice_reveal(
        &mut self,
        labels: &[String],
        on_complete: Option<D>,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) -> Result<(), SurfaceError> {
        self.cancel(sched);
        surface.render_choices("")?;
        let items: Vec<Vec<char>> = labels.iter().map(|label| label.chars().collect()).collect();
        debug!(choices = items.len(), "choice reveal started");
        self.arm(
            RevealContent::Choices {
                items,
                item: 0,
                ch: 0,
            },
            on_complete,
            sched,
        );
        Ok(())
    }

    fn arm(&mut self, content: RevealContent, on_complete: Option<D>, sched: &mut dyn TimerScheduler) {
        // Marker and separator characters are revealed like any others, so
        // they count toward the safety timer too.
        let total_chars = match &content {
            RevealContent::Story { chars, .. } => chars.len(),
            RevealContent::Choices { items, .. } => {
                let decoration = SELECTED_PREFIX.chars().count() + CHOICE_SEPARATOR.chars().count();
                items.iter().map(Vec::len).sum::<usize>() + items.len() * decoration
            }
        };
        let safety_ms = total_chars as u64 * self.char_delay_ms
            + self.completion_pause_ms
            + self.safety_margin_ms;
        let safety = sched.schedule(safety_ms, TimerEvent::Safety);
        let pending = sched.schedule(self.char_delay_ms, TimerEvent::Tick);
        self.run = Some(AnimationRun {
            content,
            rendered: String::new(),
            pending: Some(pending),
            safety: Some(safety),
            on_complete,
            awaiting_beat: false,
        });
    }

    /// Cancel the active run and both of its timers. Idempotent; cancelling a
    /// never-started animator is a no-op.
    pub fn cancel(&mut self, sched: &mut dyn TimerScheduler) {
        if let Some(mut run) = self.run.take() {
            if let Some(handle) = run.pending.take() {
                sched.cancel(handle);
            }
            if let Some(handle) = run.safety.take() {
                sched.cancel(handle);
            }
            debug!("reveal cancelled");
        }
    }

    /// Deliver a due timer. Timers that do not match the active run's own
    /// handles are ignored, so stale deliveries can never corrupt a newer run.
    ///
    /// On a surface failure the run is cancelled before the error is
    /// returned; the animator is idle afterwards.
    pub fn on_timer(
        &mut self,
        fired: TimerFired,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) -> Result<RunSignal<D>, SurfaceError> {
        let Some(run) = self.run.as_mut() else {
            return Ok(RunSignal::Idle);
        };
        match fired.event {
            TimerEvent::Safety => {
                if run.safety != Some(fired.handle) {
                    return Ok(RunSignal::Idle);
                }
                run.safety = None;
                warn!("safety timeout expired before the reveal completed");
                self.cancel(sched);
                Ok(RunSignal::SafetyExpired)
            }
            TimerEvent::Beat => {
                if run.pending != Some(fired.handle) || !run.awaiting_beat {
                    return Ok(RunSignal::Idle);
                }
                run.pending = None;
                if let Some(handle) = run.safety.take() {
                    sched.cancel(handle);
                }
                let directive = self.run.take().and_then(|run| run.on_complete);
                debug!("reveal complete");
                Ok(RunSignal::Completed(directive))
            }
            TimerEvent::Tick => {
                if run.pending != Some(fired.handle) || run.awaiting_beat {
                    return Ok(RunSignal::Idle);
                }
                run.pending = None;
                self.advance_tick(sched, surface)
            }
        }
    }

    fn advance_tick(
        &mut self,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) -> Result<RunSignal<D>, SurfaceError> {
        enum Pane {
            Story,
            Choices,
        }

        let (pane, snapshot) = {
            let Some(run) = self.run.as_mut() else {
                return Ok(RunSignal::Idle);
            };
            match &mut run.content {
                RevealContent::Story { chars, pos } => {
                    if *pos < chars.len() {
                        run.rendered.push(chars[*pos]);
                        *pos += 1;
                        (Pane::Story, Some(run.rendered.clone()))
                    } else {
                        (Pane::Story, None)
                    }
                }
                RevealContent::Choices { items, item, ch } => {
                    if *item < items.len() {
                        if *ch == 0 {
                            run.rendered.push_str(if *item == 0 {
                                SELECTED_PREFIX
                            } else {
                                UNSELECTED_PREFIX
                            });
                        }
                        if *ch < items[*item].len() {
                            run.rendered.push(items[*item][*ch]);
                            *ch += 1;
                        } else {
                            run.rendered.push_str(CHOICE_SEPARATOR);
                            *item += 1;
                            *ch = 0;
                        }
                        (Pane::Choices, Some(run.rendered.clone()))
                    } else {
                        (Pane::Choices, None)
                    }
                }
            }
        };

        if let Some(text) = snapshot {
            let written = match pane {
                Pane::Story => surface.render_story(&text),
                Pane::Choices => surface.render_choices(&text),
            };
            if let Err(err) = written {
                self.cancel(sched);
                return Err(err);
            }
            if let Some(run) = self.run.as_mut() {
                run.pending = Some(sched.schedule(self.char_delay_ms, TimerEvent::Tick));
            }
            return Ok(RunSignal::Revealing);
        }

        // Full reveal reached. With a directive attached, hold for the
        // dramatic beat first; the safety timer stays armed until the beat
        // fires so a lost beat still unblocks the session.
        let has_directive = self
            .run
            .as_ref()
            .map(|run| run.on_complete.is_some())
            .unwrap_or(false);
        if has_directive {
            if let Some(run) = self.run.as_mut() {
                run.awaiting_beat = true;
                run.pending = Some(sched.schedule(self.completion_pause_ms, TimerEvent::Beat));
            }
            Ok(RunSignal::Revealing)
        } else {
            self.cancel(sched);
            debug!("reveal complete");
            Ok(RunSignal::Completed(None))
        }
    }
}

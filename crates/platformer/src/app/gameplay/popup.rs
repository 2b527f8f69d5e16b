use engine::{TimerId, TimerQueue, UiPopupView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

const TRIGGER_DIVISOR: i32 = 5;
/// Floor on a sampled check wait, so a zero or NaN sample cannot fire every check in one tick.
const MIN_CHECK_WAIT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PopupSettings {
    pub min_check_interval: f32,
    pub max_check_interval: f32,
    pub random_min: i32,
    pub random_max: i32,
    pub auto_close_delay: f32,
    /// Whether the popup window widget exists in the scene.
    pub window: bool,
    /// Whether the popup's close button exists.
    pub close_button: bool,
    pub seed: Option<u64>,
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            min_check_interval: 2.0,
            max_check_interval: 10.0,
            random_min: 1,
            random_max: 100,
            auto_close_delay: 3.0,
            window: true,
            close_button: true,
            seed: None,
        }
    }
}

/// Source of the popup loop's randomness.
pub(crate) trait PopupSampler {
    /// Seconds to wait before the next check, uniform in `[min, max]`.
    fn check_interval(&mut self, min: f32, max: f32) -> f32;
    /// Uniform integer in `[min, max]`, both inclusive.
    fn value(&mut self, min: i32, max: i32) -> i32;
}

pub(crate) struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl PopupSampler for RandomSampler {
    fn check_interval(&mut self, min: f32, max: f32) -> f32 {
        if min.is_nan() || max.is_nan() || min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn value(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopupTimerEvent {
    RandomCheck,
    AutoClose,
}

pub(crate) fn is_trigger_value(value: i32) -> bool {
    value.rem_euclid(TRIGGER_DIVISOR) == 0
}

pub(crate) fn popup_message(value: i32, auto_close_delay: f32) -> String {
    format!("Number {value} is a multiple of 5! Closing in {auto_close_delay}s")
}

/// Periodically rolls a number and shows a dismissible popup when it is a multiple of five.
///
/// The wait-then-sample loop and the auto-close countdown are events on a private timer queue
/// driven by [`PopupManager::tick`]. At most one countdown is pending; showing again replaces it
/// and hiding cancels it.
pub(crate) struct PopupManager {
    settings: PopupSettings,
    sampler: Box<dyn PopupSampler>,
    timers: TimerQueue<PopupTimerEvent>,
    visible: bool,
    text: String,
    auto_close: Option<TimerId>,
    running: bool,
}

impl PopupManager {
    pub(crate) fn new(settings: PopupSettings, sampler: Box<dyn PopupSampler>) -> Self {
        Self {
            settings,
            sampler,
            timers: TimerQueue::new(),
            visible: false,
            text: String::new(),
            auto_close: None,
            running: false,
        }
    }

    /// Validates the widgets and schedules the first random check.
    pub(crate) fn start(&mut self) {
        if self.running {
            return;
        }
        if !self.settings.window {
            error!("popup_window_missing");
        }
        if !self.settings.close_button {
            error!("popup_close_button_missing");
        }
        self.running = true;
        self.schedule_next_check();
    }

    pub(crate) fn stop(&mut self) {
        self.timers.clear();
        self.auto_close = None;
        self.visible = false;
        self.running = false;
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn auto_close_remaining(&self) -> Option<f64> {
        self.auto_close.and_then(|id| self.timers.remaining(id))
    }

    pub(crate) fn view(&self) -> UiPopupView {
        UiPopupView {
            visible: self.visible,
            text: self.text.clone(),
        }
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        let horizon = self.timers.horizon_after(dt);
        while let Some(event) = self.timers.pop_due(horizon) {
            match event {
                PopupTimerEvent::RandomCheck => self.run_check(),
                PopupTimerEvent::AutoClose => {
                    self.auto_close = None;
                    self.visible = false;
                    info!("popup_auto_closed");
                }
            }
        }
        self.timers.advance_to(horizon);
    }

    pub(crate) fn show_popup(&mut self, message: String) {
        if !self.settings.window {
            return;
        }
        self.text = message;
        self.visible = true;
        if let Some(previous) = self.auto_close.take() {
            self.timers.cancel(previous);
        }
        self.auto_close = Some(
            self.timers
                .schedule(self.settings.auto_close_delay, PopupTimerEvent::AutoClose),
        );
        info!(text = %self.text, "popup_shown");
    }

    pub(crate) fn hide_popup(&mut self) {
        if !self.settings.window {
            return;
        }
        if let Some(pending) = self.auto_close.take() {
            self.timers.cancel(pending);
        }
        if self.visible {
            info!("popup_hidden");
        }
        self.visible = false;
    }

    /// Close-button press. Ignored when the button is missing.
    pub(crate) fn dismiss(&mut self) {
        if !self.settings.close_button {
            return;
        }
        self.hide_popup();
    }

    fn run_check(&mut self) {
        let value = self
            .sampler
            .value(self.settings.random_min, self.settings.random_max);
        debug!(value, "popup_random_check");
        if is_trigger_value(value) {
            self.show_popup(popup_message(value, self.settings.auto_close_delay));
        }
        self.schedule_next_check();
    }

    fn schedule_next_check(&mut self) {
        let wait = self.sampler.check_interval(
            self.settings.min_check_interval,
            self.settings.max_check_interval,
        );
        self.timers
            .schedule(wait.max(MIN_CHECK_WAIT), PopupTimerEvent::RandomCheck);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    const DT: f32 = 0.05;

    /// Replays fixed waits and values; repeats the last entry once exhausted.
    struct ScriptedSampler {
        waits: VecDeque<f32>,
        values: VecDeque<i32>,
        calls: Rc<RefCell<Vec<(i32, i32)>>>,
    }

    impl ScriptedSampler {
        fn boxed(waits: &[f32], values: &[i32]) -> Box<dyn PopupSampler> {
            Box::new(Self {
                waits: waits.iter().copied().collect(),
                values: values.iter().copied().collect(),
                calls: Rc::default(),
            })
        }
    }

    impl PopupSampler for ScriptedSampler {
        fn check_interval(&mut self, _min: f32, _max: f32) -> f32 {
            if self.waits.len() > 1 {
                self.waits.pop_front().unwrap_or(0.0)
            } else {
                self.waits.front().copied().unwrap_or(0.0)
            }
        }

        fn value(&mut self, min: i32, max: i32) -> i32 {
            self.calls.borrow_mut().push((min, max));
            if self.values.len() > 1 {
                self.values.pop_front().unwrap_or(0)
            } else {
                self.values.front().copied().unwrap_or(0)
            }
        }
    }

    fn run_for(manager: &mut PopupManager, seconds: f32) {
        let steps = (seconds / DT).round() as u32;
        for _ in 0..steps {
            manager.tick(DT);
        }
    }

    #[test]
    fn trigger_rule_is_divisibility_by_five() {
        assert!(is_trigger_value(15));
        assert!(is_trigger_value(100));
        assert!(is_trigger_value(0));
        assert!(is_trigger_value(-10));
        assert!(!is_trigger_value(7));
        assert!(!is_trigger_value(-3));
    }

    #[test]
    fn message_names_value_and_delay() {
        let message = popup_message(15, 3.0);
        assert!(message.contains("15"));
        assert!(message.contains("3s"));
    }

    #[test]
    fn mocked_sample_shows_then_auto_hides() {
        let mut manager =
            PopupManager::new(PopupSettings::default(), ScriptedSampler::boxed(&[5.0, 100.0], &[15]));
        manager.start();

        run_for(&mut manager, 4.9);
        assert!(!manager.is_visible());

        run_for(&mut manager, 0.15);
        assert!(manager.is_visible());
        assert!(manager.text().contains("15"));
        assert!(manager.view().visible);

        run_for(&mut manager, 2.8);
        assert!(manager.is_visible());

        run_for(&mut manager, 0.2);
        assert!(!manager.is_visible());
        assert!(manager.auto_close_remaining().is_none());
    }

    #[test]
    fn zero_wait_sample_is_floored() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sampler = ScriptedSampler {
            waits: VecDeque::from([0.0]),
            values: VecDeque::from([7]),
            calls: Rc::clone(&calls),
        };
        let mut manager = PopupManager::new(PopupSettings::default(), Box::new(sampler));
        manager.start();

        manager.tick(DT);
        assert!(calls.borrow().is_empty());

        run_for(&mut manager, 1.0);
        let checks = calls.borrow().len();
        assert!((9..=11).contains(&checks), "{checks} checks in one second");
    }

    #[test]
    fn non_multiple_never_shows() {
        let mut manager =
            PopupManager::new(PopupSettings::default(), ScriptedSampler::boxed(&[2.0], &[7]));
        manager.start();
        run_for(&mut manager, 20.0);
        assert!(!manager.is_visible());
    }

    #[test]
    fn values_are_sampled_from_configured_range() {
        let sampler = ScriptedSampler {
            waits: VecDeque::from([2.0]),
            values: VecDeque::from([3]),
            calls: Rc::default(),
        };
        let calls = Rc::clone(&sampler.calls);
        let mut manager = PopupManager::new(PopupSettings::default(), Box::new(sampler));
        manager.start();
        run_for(&mut manager, 6.1);
        assert_eq!(calls.borrow().as_slice(), &[(1, 100), (1, 100), (1, 100)]);
    }

    #[test]
    fn dismiss_cancels_pending_auto_close() {
        let mut manager =
            PopupManager::new(PopupSettings::default(), ScriptedSampler::boxed(&[1.0, 100.0], &[5]));
        manager.start();
        run_for(&mut manager, 1.05);
        assert!(manager.is_visible());

        manager.dismiss();
        assert!(!manager.is_visible());
        assert!(manager.auto_close_remaining().is_none());

        manager.show_popup("manual".to_string());
        run_for(&mut manager, 2.9);
        assert!(manager.is_visible());
        run_for(&mut manager, 0.2);
        assert!(!manager.is_visible());
    }

    #[test]
    fn second_show_restarts_countdown() {
        let mut manager =
            PopupManager::new(PopupSettings::default(), ScriptedSampler::boxed(&[100.0], &[1]));
        manager.start();

        manager.show_popup("first".to_string());
        run_for(&mut manager, 2.0);
        manager.show_popup("second".to_string());
        assert_eq!(manager.timers.pending_count(), 2);

        run_for(&mut manager, 2.0);
        assert!(manager.is_visible());
        assert_eq!(manager.text(), "second");

        run_for(&mut manager, 1.1);
        assert!(!manager.is_visible());
    }

    #[test]
    fn hide_during_countdown_prevents_later_auto_hide_of_new_show() {
        let mut manager =
            PopupManager::new(PopupSettings::default(), ScriptedSampler::boxed(&[100.0], &[1]));
        manager.start();
        manager.show_popup("first".to_string());
        run_for(&mut manager, 1.0);
        manager.hide_popup();
        run_for(&mut manager, 1.0);
        manager.show_popup("second".to_string());
        run_for(&mut manager, 2.5);
        assert!(manager.is_visible());
    }

    #[test]
    fn missing_window_keeps_loop_running_without_showing() {
        let sampler = ScriptedSampler {
            waits: VecDeque::from([1.0]),
            values: VecDeque::from([10]),
            calls: Rc::default(),
        };
        let calls = Rc::clone(&sampler.calls);
        let mut manager = PopupManager::new(
            PopupSettings {
                window: false,
                ..PopupSettings::default()
            },
            Box::new(sampler),
        );
        manager.start();
        run_for(&mut manager, 3.05);
        assert!(!manager.is_visible());
        assert_eq!(calls.borrow().len(), 3);
    }

    #[test]
    fn missing_close_button_ignores_dismiss() {
        let mut manager = PopupManager::new(
            PopupSettings {
                close_button: false,
                ..PopupSettings::default()
            },
            ScriptedSampler::boxed(&[100.0], &[1]),
        );
        manager.start();
        manager.show_popup("stuck".to_string());
        manager.dismiss();
        assert!(manager.is_visible());
        run_for(&mut manager, 3.1);
        assert!(!manager.is_visible());
    }

    #[test]
    fn seeded_sampler_stays_in_bounds() {
        let mut sampler = RandomSampler::new(Some(7));
        for _ in 0..500 {
            let wait = sampler.check_interval(2.0, 10.0);
            assert!((2.0..=10.0).contains(&wait));
            let value = sampler.value(1, 100);
            assert!((1..=100).contains(&value));
        }
        assert_eq!(sampler.value(4, 4), 4);
        assert_eq!(sampler.check_interval(3.0, 3.0), 3.0);
    }

    #[test]
    fn stop_clears_everything() {
        let mut manager =
            PopupManager::new(PopupSettings::default(), ScriptedSampler::boxed(&[1.0], &[5]));
        manager.start();
        run_for(&mut manager, 1.05);
        assert!(manager.is_visible());
        manager.stop();
        assert!(!manager.is_visible());
        assert_eq!(manager.timers.pending_count(), 0);
    }
}

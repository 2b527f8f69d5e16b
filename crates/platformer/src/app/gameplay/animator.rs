use std::collections::BTreeMap;

pub(crate) const IS_RUN: &str = "isRun";
pub(crate) const IS_JUMP: &str = "isJump";
pub(crate) const IS_KICK_BOARD: &str = "isKickBoard";
pub(crate) const TRIGGER_ATTACK: &str = "attack";
pub(crate) const TRIGGER_HURT: &str = "hurt";
pub(crate) const TRIGGER_DIE: &str = "die";
pub(crate) const TRIGGER_IDLE: &str = "idle";

/// Named animation parameters as an animation state machine would consume them. Triggers queue
/// until drained.
#[derive(Debug, Default)]
pub(crate) struct AnimatorParams {
    bools: BTreeMap<&'static str, bool>,
    pending_triggers: Vec<&'static str>,
}

impl AnimatorParams {
    pub(crate) fn set_bool(&mut self, name: &'static str, value: bool) {
        self.bools.insert(name, value);
    }

    pub(crate) fn get_bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    pub(crate) fn set_trigger(&mut self, name: &'static str) {
        self.pending_triggers.push(name);
    }

    #[cfg(test)]
    pub(crate) fn pending_triggers(&self) -> &[&'static str] {
        &self.pending_triggers
    }

    pub(crate) fn take_triggers(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.pending_triggers)
    }
}

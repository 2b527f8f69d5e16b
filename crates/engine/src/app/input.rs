#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
    Hurt,
    Die,
    Restart,
    ToggleKickBoard,
    DismissPopup,
    ToggleCameraBoundary,
    Quit,
}

const ACTION_COUNT: usize = 13;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Attack,
        InputAction::Hurt,
        InputAction::Die,
        InputAction::Restart,
        InputAction::ToggleKickBoard,
        InputAction::DismissPopup,
        InputAction::ToggleCameraBoundary,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Jump => 4,
            InputAction::Attack => 5,
            InputAction::Hurt => 6,
            InputAction::Die => 7,
            InputAction::Restart => 8,
            InputAction::ToggleKickBoard => 9,
            InputAction::DismissPopup => 10,
            InputAction::ToggleCameraBoundary => 11,
            InputAction::Quit => 12,
        }
    }
}

/// One flag per [`InputAction`]. Used both for held keys and for one-tick press edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    flags: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, value: bool) {
        self.flags[action.index()] = value;
    }

    pub(crate) fn get(&self, action: InputAction) -> bool {
        self.flags[action.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.flags = [false; ACTION_COUNT];
    }
}

/// Signed axis value from a negative/positive action pair, in `[-1, 1]`.
pub(crate) fn axis_value(states: &ActionStates, negative: InputAction, positive: InputAction) -> f32 {
    let mut value = 0.0f32;
    if states.get(positive) {
        value += 1.0;
    }
    if states.get(negative) {
        value -= 1.0;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_distinct_slot() {
        let mut seen = [false; ACTION_COUNT];
        for action in InputAction::ALL {
            assert!(!seen[action.index()], "duplicate index for {action:?}");
            seen[action.index()] = true;
        }
        assert!(seen.iter().all(|slot| *slot));
    }

    #[test]
    fn opposite_axis_actions_cancel() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveLeft, true);
        states.set(InputAction::MoveRight, true);
        assert_eq!(
            axis_value(&states, InputAction::MoveLeft, InputAction::MoveRight),
            0.0
        );

        states.set(InputAction::MoveLeft, false);
        assert_eq!(
            axis_value(&states, InputAction::MoveLeft, InputAction::MoveRight),
            1.0
        );
    }

    #[test]
    fn clear_resets_all_flags() {
        let mut states = ActionStates::default();
        states.set(InputAction::Jump, true);
        states.set(InputAction::Die, true);
        states.clear();
        assert_eq!(states, ActionStates::default());
    }
}

//! Guards against a policy server's own LLM call re-entering evaluation.

use std::cell::Cell;

thread_local! {
    static IN_EVALUATION: Cell<bool> = const { Cell::new(false) };
}

/// Held for the duration of one sequence walk. Dropping it clears the
/// thread-local flag even if the walk returns early via `?`.
pub struct Guard(());

impl Guard {
    /// Attempts to enter the evaluation window on this thread.
    ///
    /// Returns `None` if the flag is already set, meaning the caller is
    /// itself running inside a policy handler's own evaluation and must
    /// bypass evaluation entirely rather than recursing.
    pub fn enter() -> Option<Self> {
        let already_in_evaluation = IN_EVALUATION.with(|flag| {
            if flag.get() {
                true
            } else {
                flag.set(true);
                false
            }
        });

        if already_in_evaluation {
            None
        } else {
            Some(Guard(()))
        }
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        IN_EVALUATION.with(|flag| flag.set(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_second_entry_on_the_same_thread_is_refused() {
        let outer = Guard::enter().expect("first entry succeeds");
        assert!(Guard::enter().is_none());
        drop(outer);
        assert!(Guard::enter().is_some());
    }
}

//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use persona_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A, Ev> = Box<dyn FnOnce(&[Effect<A, Ev>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use persona_testing::{ReducerTest, assertions};
///
/// ReducerTest::new(PersonaReducer::new())
///     .with_env(env)
///     .given_state(PersonaState::default())
///     .when_action(PersonaAction::ProviderCancelled)
///     .then_state(|state| {
///         assert_eq!(state.session.status(), Status::Cancelled);
///     })
///     .then_effects(|effects| {
///         assertions::assert_emitted(effects, &[AuthEvent::Cancelled]);
///     })
///     .run();
/// ```
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    environment: Option<R::Environment>,
    initial_state: Option<R::State>,
    action: Option<R::Action>,
    state_assertions: Vec<StateAssertion<R::State>>,
    effect_assertions: Vec<EffectAssertion<R::Action, R::Event>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<R::Action, R::Event>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let action = self.action.expect("Action must be set with when_action()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        // Execute reducer
        let effects = self.reducer.reduce(&mut state, action, &env);

        // Run state assertions
        for assertion in self.state_assertions {
            assertion(&state);
        }

        // Run effect assertions
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use persona_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A, Ev: std::fmt::Debug>(effects: &[Effect<A, Ev>]) {
        assert!(
            effects.iter().all(|e| matches!(e, Effect::None)),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A, Ev>(effects: &[Effect<A, Ev>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A, Ev>(effects: &[Effect<A, Ev>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// Assert that effects contain no Future effect
    ///
    /// # Panics
    ///
    /// Panics if a Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_future_effect<A, Ev>(effects: &[Effect<A, Ev>]) {
        assert!(
            !effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected no Future effect, but found one"
        );
    }

    /// Assert the exact sequence of `Emit` effects, in order.
    ///
    /// # Panics
    ///
    /// Panics if the emitted events differ from `expected`.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_emitted<A, Ev>(effects: &[Effect<A, Ev>], expected: &[Ev])
    where
        Ev: std::fmt::Debug + PartialEq,
    {
        let emitted: Vec<&Ev> = effects.iter().filter_map(Effect::as_event).collect();
        let expected: Vec<&Ev> = expected.iter().collect();
        assert_eq!(emitted, expected, "Emitted events differ");
    }

    /// Assert that every `Emit` comes before the first `Future`.
    ///
    /// # Panics
    ///
    /// Panics if an event is emitted after a future has been started.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_emits_before_futures<A, Ev>(effects: &[Effect<A, Ev>]) {
        let first_future = effects
            .iter()
            .position(|e| matches!(e, Effect::Future(_)))
            .unwrap_or(effects.len());
        assert!(
            effects[first_future..]
                .iter()
                .all(|e| !matches!(e, Effect::Emit(_))),
            "Expected events to be emitted before any future is started"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::effect::Effect;
    use persona_core::reducer::Reducer;

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Decrement,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestEvent {
        Changed(i32),
    }

    struct TestReducer;

    struct TestEnv;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Event = TestEvent;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> smallvec::SmallVec<[Effect<Self::Action, Self::Event>; 4]> {
            match action {
                TestAction::Increment => {
                    state.count += 1;
                    smallvec::smallvec![Effect::Emit(TestEvent::Changed(state.count))]
                }
                TestAction::Decrement => {
                    state.count -= 1;
                    smallvec::smallvec![Effect::None]
                }
            }
        }
    }

    #[test]
    fn test_reducer_test_increment() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Increment)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .then_effects(|effects| {
                assertions::assert_emitted(effects, &[TestEvent::Changed(1)]);
                assertions::assert_no_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_decrement() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 5 })
            .when_action(TestAction::Decrement)
            .then_state(|state| {
                assert_eq!(state.count, 4);
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects::<TestAction, TestEvent>(&[Effect::None]);
        assertions::assert_no_effects::<TestAction, TestEvent>(&[]);
    }

    #[test]
    fn test_assertions_effects_count() {
        assertions::assert_effects_count(&[Effect::<TestAction, TestEvent>::None], 1);
        assertions::assert_effects_count::<TestAction, TestEvent>(&[], 0);
    }

    #[test]
    fn test_emits_before_futures() {
        let effects: Vec<Effect<TestAction, TestEvent>> = vec![
            Effect::Emit(TestEvent::Changed(1)),
            Effect::future(async { None }),
        ];
        assertions::assert_emits_before_futures(&effects);
        assertions::assert_has_future_effect(&effects);
    }
}

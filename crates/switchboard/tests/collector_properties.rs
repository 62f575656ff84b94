//! Property-based tests for collectors
//!
//! **Feature: switchboard, Property 1: Short-circuit monotonicity**
//! **Validates: collector aggregation and dispatch stop conditions**

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use switchboard::*;

/// Strategy for generating per-receiver answers
fn answers_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..24)
}

fn counting_receivers<C>(
    dispatcher: &Dispatcher<(), C>,
    answers: &[bool],
    calls: &Rc<Cell<usize>>,
) -> Vec<Receiver<(), bool>>
where
    C: Collector<Input = bool>,
{
    answers
        .iter()
        .map(|&answer| {
            let receiver = Receiver::new();
            let calls = Rc::clone(calls);
            receiver.bind(move |_: &()| {
                calls.set(calls.get() + 1);
                answer
            });
            dispatcher.subscribe_default(&receiver);
            receiver
        })
        .collect()
}

proptest! {
    /// Property 1: Once `CollectWhileTrue` has seen `false`, it never continues
    /// and its result stays `false` until reset
    #[test]
    fn prop_while_true_is_sticky(inputs in answers_strategy()) {
        let mut collector = CollectWhileTrue::new();
        let mut seen_false = false;
        for input in inputs {
            collector.consume_result(input);
            seen_false |= !input;
            prop_assert_eq!(collector.should_continue(), !seen_false);
            prop_assert_eq!(collector.result(), !seen_false);
        }

        collector.reset();
        prop_assert!(collector.should_continue());
        prop_assert!(collector.result());
    }

    /// Property 1: Once `CollectWhileFalse` has seen `true`, it never continues
    #[test]
    fn prop_while_false_is_sticky(inputs in answers_strategy()) {
        let mut collector = CollectWhileFalse::new();
        let mut seen_true = false;
        for input in inputs {
            collector.consume_result(input);
            seen_true |= input;
            prop_assert_eq!(collector.should_continue(), !seen_true);
            prop_assert_eq!(collector.result(), seen_true);
        }
    }

    /// Property 1: A while-true dispatch invokes receivers up to and including
    /// the first `false`, and no further
    #[test]
    fn prop_dispatch_stops_at_first_false(answers in answers_strategy()) {
        let calls = Rc::new(Cell::new(0));
        let dispatcher: Dispatcher<(), CollectWhileTrue> = Dispatcher::new();
        let _receivers = counting_receivers(&dispatcher, &answers, &calls);

        let result = dispatcher.dispatch(&());

        let expected_calls = answers
            .iter()
            .position(|answer| !answer)
            .map_or(answers.len(), |index| index + 1);
        prop_assert_eq!(calls.get(), expected_calls);
        prop_assert_eq!(result, answers.iter().all(|answer| *answer));
    }

    /// Property 1: A while-false dispatch stops right after the first `true`
    #[test]
    fn prop_dispatch_stops_at_first_true(answers in answers_strategy()) {
        let calls = Rc::new(Cell::new(0));
        let dispatcher: Dispatcher<(), CollectWhileFalse> = Dispatcher::new();
        let _receivers = counting_receivers(&dispatcher, &answers, &calls);

        let result = dispatcher.dispatch(&());

        let expected_calls = answers
            .iter()
            .position(|answer| *answer)
            .map_or(answers.len(), |index| index + 1);
        prop_assert_eq!(calls.get(), expected_calls);
        prop_assert_eq!(result, answers.iter().any(|answer| *answer));
    }

    /// Property 2: `CollectLast` returns the last consumed value, or the seed
    #[test]
    fn prop_collect_last_tracks_last(
        seed in any::<i64>(),
        inputs in prop::collection::vec(any::<i64>(), 0..16),
    ) {
        let mut collector = CollectLast::new(seed);
        for input in &inputs {
            collector.consume_result(*input);
            prop_assert!(collector.should_continue());
        }
        prop_assert_eq!(collector.result(), inputs.last().copied().unwrap_or(seed));

        collector.reset();
        prop_assert_eq!(collector.result(), seed);
    }
}

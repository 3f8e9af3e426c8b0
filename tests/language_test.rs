//! End-to-end language tests: source text in, Value out.

use proptest::prelude::*;
use std::sync::Arc;
use tradelang::domain::builtins::Builtins;
use tradelang::domain::docstrings::get_docstrings;
use tradelang::domain::error::LangError;
use tradelang::domain::input::InputValues;
use tradelang::domain::ir::Command;
use tradelang::domain::program::{check, evaluate};
use tradelang::domain::span::Span;
use tradelang::domain::value::Value;

fn eval_const(src: &str) -> Result<Value, LangError> {
    evaluate(src, &Builtins::standard(), &InputValues::zeros())
}

fn prices(values: &[f64]) -> InputValues {
    let p: Arc<[f64]> = values.into();
    InputValues::from_arrays(p.clone(), p.clone(), p.clone(), p.clone(), p.clone(), p)
}

fn eval_over(src: &str, values: &[f64]) -> Value {
    evaluate(src, &Builtins::standard(), &prices(values)).unwrap()
}

mod properties {
    use super::*;

    #[test]
    fn literal() {
        assert_eq!(eval_const("1").unwrap().at(0), 1.0);
    }

    #[test]
    fn application() {
        assert_eq!(eval_const("add 1 2").unwrap().at(0), 3.0);
    }

    #[test]
    fn let_binding() {
        assert_eq!(eval_const("let x = 2 in mul x x").unwrap().at(0), 4.0);
    }

    #[test]
    fn pipeline_is_application() {
        let piped = eval_const("3 |> add 1").unwrap();
        let direct = eval_const("add 3 1").unwrap();
        assert_eq!(piped.at(0), direct.at(0));
        assert_eq!(piped.at(0), 4.0);
    }

    #[test]
    fn unknown_reference() {
        assert_eq!(
            eval_const("foo").unwrap_err(),
            LangError::Reference {
                name: "foo".into(),
                span: Span::new(0, 3),
            }
        );
    }

    #[test]
    fn wrong_argument_count() {
        let err = eval_const("add 1").unwrap_err();
        assert!(matches!(err, LangError::Application { want: 2, got: 1, .. }));
    }

    #[test]
    fn nan_in_window_poisons_mean() {
        let v = eval_over("mean price 3", &[1.0, f64::NAN, 3.0, 4.0, 5.0]);
        assert_eq!(v.at(0), 4.0);
        assert!(v.at(1).is_nan());
        assert!(v.at(2).is_nan());
    }

    #[test]
    fn window_past_history_is_nan() {
        let v = eval_over("mean price 20", &[1.0, 2.0, 3.0]);
        assert!(v.at(0).is_nan());
    }
}

mod semantics {
    use super::*;

    #[test]
    fn offset_zero_is_latest_sample() {
        let v = eval_over("price", &[1.0, 2.0, 3.0]);
        assert_eq!(v.at(0), 3.0);
        assert_eq!(v.at(2), 1.0);
        assert!(v.at(3).is_nan());
    }

    #[test]
    fn let_shadows_builtin() {
        assert_eq!(eval_const("let price = 7 in add price 1").unwrap().at(0), 8.0);
    }

    #[test]
    fn nested_let_shadows_outer() {
        let src = "let x = 1 in let x = add x 10 in mul x 2";
        assert_eq!(eval_const(src).unwrap().at(0), 22.0);
    }

    #[test]
    fn comments_are_ignored() {
        let src = "# Doubler\n# Twice the price.\nmul price 2 # trailing\n";
        assert_eq!(eval_over(src, &[1.0, 4.0]).at(0), 8.0);
    }

    #[test]
    fn chained_pipeline() {
        let v = eval_over("price |> diff 1 |> sign", &[3.0, 2.0, 5.0]);
        assert_eq!(v.at(0), 1.0);
        assert_eq!(v.at(1), -1.0);
        assert!(v.at(2).is_nan());
    }

    #[test]
    fn if_picks_branch_per_sample() {
        let v = eval_over("if (gt price 2) 1 (neg 1)", &[1.0, 3.0]);
        assert_eq!(v.at(0), 1.0);
        assert_eq!(v.at(1), -1.0);
    }

    #[test]
    fn bare_builtin_reference_is_result() {
        assert_eq!(eval_over("close", &[4.0, 9.0]).at(0), 9.0);
    }

    #[test]
    fn time_counts_offsets() {
        let v = eval_const("time").unwrap();
        assert_eq!(v.at(0), 0.0);
        assert_eq!(v.at(5), 5.0);
    }

    #[test]
    fn random_is_sampled_per_read() {
        let v = eval_const("random").unwrap();
        let draws = v.materialize(64);
        assert!(draws.iter().all(|x| (0.0..1.0).contains(x)));
        assert!(draws.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn same_registry_serves_many_inputs() {
        let builtins = Builtins::standard();
        let a = evaluate("price", &builtins, &prices(&[1.0])).unwrap();
        let b = evaluate("price", &builtins, &prices(&[2.0])).unwrap();
        assert_eq!(a.at(0), 1.0);
        assert_eq!(b.at(0), 2.0);
        assert_eq!(evaluate("price", &builtins, &InputValues::zeros()).unwrap().at(0), 0.0);
    }
}

mod errors {
    use super::*;

    #[test]
    fn bad_character_has_position() {
        let err = eval_const("add 1 $").unwrap_err();
        assert_eq!(
            err,
            LangError::Character {
                value: '$',
                span: Span::new(6, 7),
            }
        );
    }

    #[test]
    fn unclosed_paren() {
        let err = eval_const("(add 1 2").unwrap_err();
        assert!(matches!(err, LangError::Token { ref want, .. } if want == ")"));
    }

    #[test]
    fn trailing_tokens_rejected() {
        assert!(matches!(eval_const("1 2"), Err(LangError::Token { .. })));
    }

    #[test]
    fn applying_a_reference_builtin() {
        let err = eval_const("price 1").unwrap_err();
        assert!(matches!(err, LangError::Application { want: 0, got: 1, .. }));
    }

    #[test]
    fn context_points_at_offender() {
        let src = "let x = 1 in\nadd x bogus";
        let err = eval_const(src).unwrap_err();
        let shown = err.display_with_context(src);
        let lines: Vec<&str> = shown.lines().collect();
        assert_eq!(lines[0], "add x bogus");
        assert_eq!(lines[1], "      ^^^^^");
    }

    #[test]
    fn unknown_name_in_pipeline() {
        let err = eval_const("1 |> frobnicate 2").unwrap_err();
        assert!(matches!(err, LangError::Reference { ref name, .. } if name == "frobnicate"));
    }
}

mod docstrings {
    use super::*;

    #[test]
    fn name_and_description() {
        let docs = get_docstrings("# Crossover\n# Fast over slow.\n#\n# More.\ngt (ema price 5) (ema price 20)");
        assert_eq!(docs.name, "Crossover");
        assert_eq!(docs.description.as_deref(), Some("Fast over slow. More."));
    }

    #[test]
    fn code_first_is_default_name() {
        let docs = get_docstrings("price\n# not a docstring");
        assert_eq!(docs.name, "Algorithm");
        assert_eq!(docs.description, None);
    }
}

/// Well-formed sources built from a small slice of the vocabulary.
fn source_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0u32..100).prop_map(|n| n.to_string()),
        Just("price".to_string()),
        Just("volume".to_string()),
        Just("time".to_string()),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("add ({a}) ({b})")),
            (inner.clone(), 1u32..10).prop_map(|(a, n)| format!("mean ({a}) {n}")),
            inner.clone().prop_map(|a| format!("({a}) |> neg")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, a, b)| format!("if ({c}) ({a}) ({b})")),
            (inner.clone(), inner).prop_map(|(v, b)| format!("let v = {v} in add v ({b})")),
        ]
    })
}

proptest! {
    #[test]
    fn nan_anywhere_in_window_poisons_mean(n in 1usize..50, at in 0usize..50) {
        let at = at % n;
        let mut values = vec![1.0; n + 5];
        let last = values.len() - 1;
        values[last - at] = f64::NAN;
        let v = eval_over(&format!("mean price {n}"), &values);
        prop_assert!(v.at(0).is_nan());
        prop_assert!(v.at(at).is_nan());
        if at + n < values.len() {
            prop_assert_eq!(v.at(at + 1), 1.0);
        }
    }

    #[test]
    fn zscore_on_any_flat_window_is_zero(n in 1usize..50, level in -1e6f64..1e6) {
        let v = eval_over(&format!("zscore price {n}"), &vec![level; n + 5]);
        prop_assert_eq!(v.at(0), 0.0);
    }

    #[test]
    fn arbitrary_text_never_panics(src in "\\PC{0,64}") {
        let _ = eval_const(&src);
    }

    #[test]
    fn arbitrary_tokens_never_panic(
        words in proptest::collection::vec(
            prop_oneof![
                Just("let"), Just("in"), Just("="), Just("("), Just(")"), Just("|>"),
                Just("add"), Just("mean"), Just("price"), Just("1"), Just("-2.5"), Just("x"),
            ],
            0..24,
        )
    ) {
        let _ = eval_const(&words.join(" "));
    }

    #[test]
    fn lowered_operands_precede_their_use(src in source_strategy()) {
        let program = check(&src, &Builtins::standard()).unwrap();
        prop_assert!(program.verify().is_ok());
        for (index, command) in program.commands.iter().enumerate() {
            if let Command::Application { args, .. } = command {
                prop_assert!(args.iter().all(|a| *a < index));
            }
        }
        let value = evaluate(&src, &Builtins::standard(), &prices(&[1.0, 2.0, 3.0])).unwrap();
        let _ = value.materialize(5);
    }
}

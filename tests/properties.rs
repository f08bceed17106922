//! Property-based coverage for the two guarantees the parser promises
//! regardless of input: it never panics and it always terminates, even on
//! pathological nesting depth or unbalanced markup.

use doccomment_core::CollectingReporter;
use proptest::prelude::*;

fn parse(raw: &str) -> doccomment_core::Comment {
    let mut reporter = CollectingReporter::default();
    doccomment_core::parse(raw, 1u32, &mut reporter)
}

proptest! {
    // Arbitrary printable text inside a comment should never panic the
    // parser, no matter how it mangles the wiki-markup sigils.
    #[test]
    fn arbitrary_comment_body_never_panics(body in "\\PC{0,200}") {
        let raw = format!("/** {body} */");
        let _ = parse(&raw);
    }

    // A list nested one level deeper per line, well past the recursion
    // guard's cap, must still return rather than overflow the stack.
    #[test]
    fn deeply_nested_list_terminates(depth in 1usize..500) {
        let mut body = String::new();
        for i in 0..depth {
            body.push_str(&" ".repeat(i + 1));
            body.push_str("- item\n");
        }
        let mut r = CollectingReporter::default();
        let _ = doccomment_core::wiki::parse_body(&body, 1u32.into(), &mut r);
    }

    // Re-cleaning an already-cleaned-and-rewrapped comment is a no-op:
    // the line cleaner's output, once wrapped back into `/** * ... */`
    // form, cleans to the same lines again.
    #[test]
    fn line_cleaner_is_idempotent(sentence in "[a-zA-Z0-9 .]{0,60}") {
        let mut r1 = CollectingReporter::default();
        let raw = format!("/** {sentence} */");
        let first = doccomment_core::line_cleaner::clean_lines(&raw, 1u32.into(), &mut r1);

        let rewrapped = format!(
            "/**\n{}\n */",
            first.iter().map(|l| format!(" * {l}")).collect::<Vec<_>>().join("\n")
        );
        let mut r2 = CollectingReporter::default();
        let second = doccomment_core::line_cleaner::clean_lines(&rewrapped, 1u32.into(), &mut r2);

        prop_assert_eq!(first, second);
    }
}

use secret_mafia_lib::Phase;
use secret_mafia_lib::PlayerId;

use crate::parser::extract_tag;
use crate::parser::extract_target;
use crate::prompts;

#[test]
fn test_extract_tag_basic() {
    assert_eq!(
        extract_tag("<vote>[player 2]</vote>", "vote").as_deref(),
        Some("[player 2]")
    );

    // Content is trimmed.
    assert_eq!(
        extract_tag("<vote>\n  [player 2]\n</vote>", "vote").as_deref(),
        Some("[player 2]")
    );

    // Other tags are not confused with the expected one.
    assert_eq!(
        extract_tag("<reflect>hmm</reflect><vote>[3]</vote>", "vote").as_deref(),
        Some("[3]")
    );
}

#[test]
fn test_extract_tag_takes_last_pair() {
    // Reasoning preambles may quote the tag; the last opening and last
    // closing tag win.
    let action = "I should use <vote>[player 1]</vote> syntax. \
                  Final answer: <vote>[player 4]</vote>";

    assert_eq!(extract_tag(action, "vote").as_deref(), Some("[player 4]"));

    // Malformed nesting is tolerated by the same rule: the span between the
    // last opening and last closing tag is taken as-is.
    let nested = "<vote>outer <vote>inner</vote>";
    assert_eq!(extract_tag(nested, "vote").as_deref(), Some("inner"));
}

#[test]
fn test_extract_tag_failures() {
    assert_eq!(extract_tag("I vote Player 2", "vote"), None);
    assert_eq!(extract_tag("<vote>[player 2]", "vote"), None);
    assert_eq!(extract_tag("[player 2]</vote>", "vote"), None);

    // Last opening tag after the last closing tag.
    assert_eq!(extract_tag("</vote>[player 2]<vote>", "vote"), None);

    // Wrong tag entirely.
    assert_eq!(extract_tag("<mafia_vote>[2]</mafia_vote>", "vote"), None);
}

#[test]
fn test_extract_target_formats() {
    assert_eq!(extract_target("[player 3]"), Some(PlayerId(3)));
    assert_eq!(extract_target("[Player 3]"), Some(PlayerId(3)));
    assert_eq!(extract_target("[PLAYER 12]"), Some(PlayerId(12)));
    assert_eq!(extract_target("[7]"), Some(PlayerId(7)));
    assert_eq!(extract_target("I pick [player  4] today"), Some(PlayerId(4)));

    // First match wins.
    assert_eq!(extract_target("[player 1] not [player 2]"), Some(PlayerId(1)));

    assert_eq!(extract_target("player 3"), None);
    assert_eq!(extract_target("[player]"), None);
    assert_eq!(extract_target("[player -1]"), None);
    assert_eq!(extract_target(""), None);

    // Absurdly long digit strings fail rather than wrap.
    assert_eq!(extract_target("[99999999999999999999999999]"), None);
}

#[test]
fn test_phase_action_tags() {
    assert_eq!(Phase::NightMafiaDiscussion.action_tag(), "mafia_suggest");
    assert_eq!(Phase::NightMafiaVote.action_tag(), "mafia_vote");
    assert_eq!(Phase::NightDoctor.action_tag(), "protect");
    assert_eq!(Phase::NightDetective.action_tag(), "investigate");
    assert_eq!(Phase::DayReflection.action_tag(), "reflect");
    assert_eq!(Phase::DayDiscussion.action_tag(), "discussion");
    assert_eq!(Phase::DayVote.action_tag(), "vote");
}

#[test]
fn test_announcement_texts() {
    insta::assert_snapshot!(
        prompts::night_elimination(Some(PlayerId(3))),
        @"Player 3 has been eliminated during the night."
    );
    insta::assert_snapshot!(
        prompts::night_elimination(None),
        @"No player has been eliminated during the night."
    );
    insta::assert_snapshot!(
        prompts::day_elimination(Some(PlayerId(0))),
        @"Player 0 has been eliminated after voting."
    );
    insta::assert_snapshot!(
        prompts::detective_result(PlayerId(5), true),
        @"Player 5 is part of the Mafia"
    );
    insta::assert_snapshot!(
        prompts::detective_result(PlayerId(5), false),
        @"Player 5 is NOT part of the Mafia"
    );
}

//! Classification fixtures, one group per rule family.

use chatdemux::message::{CallType, MessageBody, SettingsChange};
use chatdemux::prelude::*;
use serde_json::{Value, json};

const OWNER: &str = "John Smith";

/// Feeds records with sensible defaults: sender `John Smith`, type
/// `Generic`, timestamps one second apart.
struct Spoof {
    feed: MemoryFeed,
    next_timestamp: i64,
}

impl Spoof {
    fn new() -> Self {
        Self {
            feed: MemoryFeed::new([OWNER]),
            next_timestamp: 0,
        }
    }

    fn push(&mut self, record: RawRecord) {
        self.next_timestamp = record.timestamp_ms + 1000;
        self.feed.push(record);
    }

    fn said_by(&mut self, sender: &str, content: &str) {
        let record = RawRecord::new(sender, self.next_timestamp)
            .with_type("Generic")
            .with_content(content);
        self.push(record);
    }

    fn said(&mut self, content: &str) {
        self.said_by(OWNER, content);
    }

    fn push_json(&mut self, mut value: Value) {
        let object = value.as_object_mut().unwrap();
        object
            .entry("sender_name")
            .or_insert_with(|| json!(OWNER));
        object.entry("type").or_insert_with(|| json!("Generic"));
        object
            .entry("timestamp_ms")
            .or_insert_with(|| json!(self.next_timestamp));
        self.push(RawRecord::from_json(value).unwrap());
    }

    fn build(self, owner: &str) -> Chat {
        build_chat(self.feed, owner).unwrap()
    }
}

fn bodies(chat: &Chat) -> Vec<MessageBody> {
    chat.messages().iter().map(|m| m.body.clone()).collect()
}

// =========================================================================
// Media and empty records
// =========================================================================

#[test]
fn test_media_messages() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({
        "photos": [{"uri": "messages/inbox/convo/photos/blah.png", "creation_timestamp": 1000}]
    }));
    spoof.push_json(json!({
        "content": "What do these mean?",
        "photos": [
            {"uri": "messages/inbox/convo/photos/blah.png", "creation_timestamp": 1000},
            {"uri": "messages/inbox/convo/photos/blah1.png", "creation_timestamp": 2000}
        ]
    }));
    spoof.push_json(json!({"gifs": [{"uri": "messages/inbox/convo/gifs/blah.gif"}]}));
    spoof.push_json(json!({
        "audio_files": [{"uri": "messages/inbox/convo/audio/blah.mp4", "creation_timestamp": 1000}]
    }));
    spoof.push_json(json!({
        "videos": [{
            "uri": "messages/inbox/convo/videos/blah.mp4",
            "creation_timestamp": 1000,
            "thumbnail": {"uri": "messages/inbox/convo/videos/thumbnails/blarg.jpg"}
        }]
    }));
    spoof.push_json(json!({
        "files": [{"uri": "messages/inbox/convo/files/blah.pdf", "creation_timestamp": 1000}]
    }));
    spoof.push_json(json!({"sticker": {"uri": "messages/stickers_used/blah.png"}}));

    let chat = spoof.build(OWNER);
    let bundles: Vec<_> = chat
        .messages()
        .iter()
        .map(|message| match &message.body {
            MessageBody::Media(bundle) => bundle.clone(),
            other => panic!("expected media, got {other:?}"),
        })
        .collect();

    assert_eq!(chat.messages()[0].content(), None);
    assert_eq!(bundles[0].photos.len(), 1);
    assert_eq!(bundles[0].len(), 1);

    assert_eq!(chat.messages()[1].content(), Some("What do these mean?"));
    assert_eq!(bundles[1].photos.len(), 2);

    assert_eq!(bundles[2].gifs.len(), 1);
    assert!(bundles[2].photos.is_empty());
    assert_eq!(bundles[3].audio_files.len(), 1);
    assert_eq!(bundles[4].videos.len(), 1);
    assert_eq!(
        bundles[4].videos[0].thumbnail_uri.as_deref(),
        Some("messages/inbox/convo/videos/thumbnails/blarg.jpg")
    );
    assert_eq!(bundles[5].files.len(), 1);
    assert_eq!(bundles[6].stickers.len(), 1);
}

#[test]
fn test_caption_that_reads_like_system_sentence_is_still_media() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({
        "content": "John left the group.",
        "photos": [{"uri": "photos/a.png"}]
    }));
    let chat = spoof.build(OWNER);
    assert!(matches!(chat.messages()[0].body, MessageBody::Media(_)));
}

#[test]
fn test_empty_message() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({}));
    let chat = spoof.build(OWNER);
    assert_eq!(chat.messages()[0].body, MessageBody::Empty);
}

// =========================================================================
// Calls
// =========================================================================

#[test]
fn test_call_messages() {
    let mut spoof = Spoof::new();
    spoof.said("John started a video chat.");
    spoof.said("John joined the video chat.");
    spoof.said("The video chat ended.");
    spoof.said("John started a call.");
    spoof.said("John joined the call.");
    spoof.said("John started sharing video.");
    spoof.said("The call ended.");

    let chat = spoof.build("Jake Smith");
    let bodies = bodies(&chat);

    assert!(matches!(
        bodies[0],
        MessageBody::CallStart {
            call_type: CallType::Video,
            ..
        }
    ));
    assert_eq!(
        bodies[1],
        MessageBody::CallJoin {
            call_type: CallType::Video
        }
    );
    assert!(matches!(
        bodies[2],
        MessageBody::CallEnd {
            call_type: CallType::Video,
            ..
        }
    ));
    assert!(matches!(
        bodies[3],
        MessageBody::CallStart {
            call_type: CallType::Audio,
            ..
        }
    ));
    assert_eq!(
        bodies[4],
        MessageBody::CallJoin {
            call_type: CallType::Audio
        }
    );
    assert_eq!(bodies[5], MessageBody::CallShareVideo);
    assert!(matches!(
        bodies[6],
        MessageBody::CallEnd {
            call_type: CallType::Audio,
            ..
        }
    ));
}

#[test]
fn test_call_duration_is_carried() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({
        "type": "Call",
        "content": "John started a call.",
        "call_duration": 125
    }));
    let chat = spoof.build(OWNER);
    assert_eq!(
        chat.messages()[0].body,
        MessageBody::CallStart {
            call_type: CallType::Audio,
            duration_secs: Some(125)
        }
    );
}

#[test]
fn test_call_join_without_call_is_text() {
    let mut spoof = Spoof::new();
    spoof.said("John joined the call.");
    let chat = spoof.build(OWNER);
    assert_eq!(chat.messages()[0].body, MessageBody::Text);
}

// =========================================================================
// Nicknames
// =========================================================================

#[test]
fn test_nickname_change_messages() {
    let mut spoof = Spoof::new();
    spoof.said_by("Joseph", "Joseph cleared his own nickname.");
    spoof.said_by("Joseph", "Joseph cleared your nickname.");
    spoof.said_by("Joseph", "Joseph cleared the nickname for Jacob.");
    spoof.said_by("Joseph", "Joseph set the nickname for Jacob to Jake.");
    spoof.said_by("Joseph", "Joseph set your nickname to John.");
    spoof.said_by("Joseph", "Joseph set their own nickname to Joe.");
    spoof.said("You cleared your nickname.");
    spoof.said("You cleared the nickname for Joseph.");
    spoof.said("You set the nickname for Joseph to Joe.");
    spoof.said("You set your nickname to John.");

    let mut chat = spoof.build(OWNER);
    let joseph = chat.get_participant("Joseph").id();
    let jacob = chat.get_participant("Jacob").id();
    let me = chat.owner().id();

    let expected = [
        (joseph, joseph, None),
        (joseph, me, None),
        (joseph, jacob, None),
        (joseph, jacob, Some("Jake")),
        (joseph, me, Some("John")),
        (joseph, joseph, Some("Joe")),
        (me, me, None),
        (me, joseph, None),
        (me, joseph, Some("Joe")),
        (me, me, Some("John")),
    ];

    assert_eq!(chat.len(), expected.len());
    for (message, (setter, subject, nickname)) in chat.messages().iter().zip(expected) {
        assert_eq!(
            message.body,
            MessageBody::NicknameChange {
                setter,
                subject,
                new_nickname: nickname.map(String::from),
            },
            "{:?}",
            message.content()
        );
    }
}

#[test]
fn test_nickname_keeps_inner_punctuation() {
    let mut spoof = Spoof::new();
    spoof.said_by("Joseph", "Joseph set your nickname to Don 2.0.");
    spoof.said_by("Joseph", "Joseph set your nickname to Wow!");
    let chat = spoof.build(OWNER);
    let nicknames: Vec<_> = chat
        .messages()
        .iter()
        .map(|message| match &message.body {
            MessageBody::NicknameChange { new_nickname, .. } => new_nickname.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        nicknames,
        [Some("Don 2.0".to_string()), Some("Wow!".to_string())]
    );
}

// =========================================================================
// Chat settings
// =========================================================================

#[test]
fn test_chat_settings_change_messages() {
    let mut spoof = Spoof::new();
    spoof.said("Jacob named the group Saturday Hangout.");
    spoof.said("Jacob changed the group photo.");
    spoof.said("Jacob changed the chat theme.");
    spoof.said("Jacob set the emoji to 🍺.");
    spoof.said(
        "Jacob turned on member approval and will review requests to join the group.",
    );
    spoof.said("Jacob turned off member approval. Anyone with the link can join the group.");

    let chat = spoof.build(OWNER);
    let settings: Vec<_> = chat
        .messages()
        .iter()
        .map(|message| match &message.body {
            MessageBody::ChatSettingsChange(change) => change.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();

    assert_eq!(
        settings,
        [
            SettingsChange::Name("Saturday Hangout".into()),
            SettingsChange::Photo,
            SettingsChange::Theme,
            SettingsChange::Emoji("🍺".into()),
            SettingsChange::MemberApproval(true),
            SettingsChange::MemberApproval(false),
        ]
    );
}

// =========================================================================
// Plans
// =========================================================================

#[test]
fn test_plan_messages() {
    let mut spoof = Spoof::new();
    spoof.said("Joseph responded ");
    spoof.said("Jacob started a plan.");
    spoof.said("Jacob named the plan Saturday Hangout.");
    spoof.said("Jacob updated the plan to Sat, Aug 5 at 12 PM.");
    spoof.said("Joseph responded ");
    spoof.said("Jacob deleted the plan Saturday Hangout for Sat, Aug 5 at 12 PM.");
    spoof.said("Joseph responded ");

    let chat = spoof.build(OWNER);
    let bodies = bodies(&chat);

    assert_eq!(bodies[0], MessageBody::Text);
    assert_eq!(bodies[1], MessageBody::PlanCreation { title: None });
    assert_eq!(
        bodies[2],
        MessageBody::PlanUpdate {
            new_title: Some("Saturday Hangout".into()),
            new_date_time: None
        }
    );
    assert_eq!(
        bodies[3],
        MessageBody::PlanUpdate {
            new_title: None,
            new_date_time: Some("Sat, Aug 5 at 12 PM".into())
        }
    );
    assert_eq!(bodies[4], MessageBody::PlanResponse);
    assert_eq!(
        bodies[5],
        MessageBody::PlanDeletion {
            title: Some("Saturday Hangout".into()),
            date_time: "Sat, Aug 5 at 12 PM".into()
        }
    );
    assert_eq!(bodies[6], MessageBody::Text);
}

#[test]
fn test_plan_reminders() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({
        "content": "Jacob started a plan.",
        "plan": {"title": "Dinner"}
    }));
    spoof.said("Reminder, 30 minutes until 7 PM.");
    spoof.said("Reminder, 30 minutes until Dinner at 7 PM.");
    spoof.said("Reminder, Dinner at 7 PM.");
    spoof.said("Reminder at 7 PM.");

    let chat = spoof.build(OWNER);
    let bodies = bodies(&chat);

    assert_eq!(
        bodies[0],
        MessageBody::PlanCreation {
            title: Some("Dinner".into())
        }
    );
    assert_eq!(
        bodies[1],
        MessageBody::PlanReminder {
            is_concurrent: false,
            title: None,
            hour: "7 PM".into()
        }
    );
    assert_eq!(
        bodies[2],
        MessageBody::PlanReminder {
            is_concurrent: false,
            title: Some("Dinner".into()),
            hour: "7 PM".into()
        }
    );
    assert_eq!(
        bodies[3],
        MessageBody::PlanReminder {
            is_concurrent: true,
            title: Some("Dinner".into()),
            hour: "7 PM".into()
        }
    );
    // The plan closed with the previous reminder.
    assert_eq!(bodies[4], MessageBody::Text);
}

#[test]
fn test_untitled_plan_deletion() {
    let mut spoof = Spoof::new();
    spoof.said("Jacob started a plan.");
    spoof.said("Jacob deleted the plan for Sat, Aug 5 at 12 PM.");
    spoof.said("Jacob started a plan.");

    let chat = spoof.build(OWNER);
    let bodies = bodies(&chat);
    assert_eq!(
        bodies[1],
        MessageBody::PlanDeletion {
            title: None,
            date_time: "Sat, Aug 5 at 12 PM".into()
        }
    );
    assert_eq!(bodies[2], MessageBody::PlanCreation { title: None });
}

// =========================================================================
// Polls
// =========================================================================

#[test]
fn test_poll_creation_prefers_embedded_title() {
    let mut spoof = Spoof::new();
    spoof.push(
        RawRecord::new(OWNER, 0)
            .with_type("Generic")
            .with_content("John created a poll: Movie night?")
            .with_poll_title("Movie night?"),
    );
    spoof.said("John created a poll: Lunch.");

    let chat = spoof.build(OWNER);
    assert_eq!(
        chat.messages()[0].body,
        MessageBody::PollCreation {
            name: "Movie night?".into()
        }
    );
    assert_eq!(
        chat.messages()[1].body,
        MessageBody::PollCreation {
            name: "Lunch".into()
        }
    );
}

#[test]
fn test_poll_votes() {
    let mut spoof = Spoof::new();
    spoof.said(r#"John voted for "Pizza" in the poll: Dinner?"#);
    spoof.said(r#"John voted for "Pizza" and 2 other options in the poll: Dinner?"#);
    spoof.said(r#"John voted for "Pizza" and 1 other option in the poll: Dinner?"#);
    spoof.said(r#"John removed his vote for "Pizza" in the poll: Dinner?"#);
    spoof.said(r#"You removed your vote for "Pizza" and 3 other options in the poll: Dinner?"#);
    spoof.said(r#"John changed his vote to "Tacos" in the poll: Dinner?"#);
    spoof.said("This poll is no longer available.");

    let chat = spoof.build(OWNER);
    let bodies = bodies(&chat);

    let add = |hidden| MessageBody::PollAddVote {
        poll_name: "Dinner?".into(),
        option: "Pizza".into(),
        hidden_vote_count: hidden,
    };
    assert_eq!(bodies[0], add(0));
    assert_eq!(bodies[1], add(2));
    assert_eq!(bodies[2], add(1));
    assert_eq!(
        bodies[3],
        MessageBody::PollRemoveVote {
            poll_name: "Dinner?".into(),
            option: "Pizza".into(),
            hidden_vote_count: 0
        }
    );
    assert_eq!(
        bodies[4],
        MessageBody::PollRemoveVote {
            poll_name: "Dinner?".into(),
            option: "Pizza".into(),
            hidden_vote_count: 3
        }
    );
    assert_eq!(
        bodies[5],
        MessageBody::PollChangeVote {
            poll_name: "Dinner?".into(),
            option: "Tacos".into()
        }
    );
    assert_eq!(bodies[6], MessageBody::PollExpired);
}

// =========================================================================
// Admins, apps, waves
// =========================================================================

#[test]
fn test_admin_messages() {
    let mut spoof = Spoof::new();
    spoof.said_by("Jacob", "Jacob added Joseph Smith as a group admin.");
    spoof.said_by("Jacob", "Jacob removed Joseph Smith as a group admin.");

    let mut chat = spoof.build(OWNER);
    let jacob = chat.get_participant("Jacob").id();
    let joseph = chat.get_participant("Joseph Smith").id();
    assert_eq!(
        chat.messages()[0].body,
        MessageBody::AdminAdd {
            instigator: jacob,
            subject: joseph
        }
    );
    assert_eq!(
        chat.messages()[1].body,
        MessageBody::AdminRemove {
            instigator: jacob,
            subject: joseph
        }
    );
}

#[test]
fn test_app_messages() {
    let mut spoof = Spoof::new();
    spoof.said("John just scored 120 points in Words With Friends.");
    spoof.said("John scored 3 playing EverWing.");
    spoof.said("John set a new personal best of 4 points in Basketball FRVR.");
    spoof.said("John moved up the leaderboard in EverWing.");
    spoof.said("John is now in first place in EverWing.");
    spoof.said("John challenged you in Snake.");

    let chat = spoof.build(OWNER);
    let bodies = bodies(&chat);

    assert_eq!(
        bodies[0],
        MessageBody::AppScore {
            app_name: "Words With Friends".into(),
            score: "120".into(),
            personal_best: false
        }
    );
    assert_eq!(
        bodies[1],
        MessageBody::AppScore {
            app_name: "EverWing".into(),
            score: "3".into(),
            personal_best: false
        }
    );
    assert_eq!(
        bodies[2],
        MessageBody::AppScore {
            app_name: "Basketball FRVR".into(),
            score: "4".into(),
            personal_best: true
        }
    );
    assert_eq!(
        bodies[3],
        MessageBody::AppLeaderboard {
            app_name: "EverWing".into(),
            now_in_first_place: false
        }
    );
    assert_eq!(
        bodies[4],
        MessageBody::AppLeaderboard {
            app_name: "EverWing".into(),
            now_in_first_place: true
        }
    );
    assert_eq!(
        bodies[5],
        MessageBody::AppChallenge {
            app_name: "Snake".into()
        }
    );
}

#[test]
fn test_wave() {
    let mut spoof = Spoof::new();
    spoof.said_by("Joseph Smith", "Joseph waved hello to the group.");
    let chat = spoof.build(OWNER);
    assert_eq!(chat.messages()[0].body, MessageBody::Wave);
}

// =========================================================================
// Membership and shares
// =========================================================================

#[test]
fn test_subscribe() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({
        "sender_name": "Jacob",
        "type": "Subscribe",
        "content": "Jacob added Joseph and Mary to the group.",
        "users": [{"name": "Joseph"}, {"name": "Mary"}]
    }));

    let mut chat = spoof.build(OWNER);
    let jacob = chat.get_participant("Jacob").id();
    let joseph = chat.get_participant("Joseph").id();
    let mary = chat.get_participant("Mary").id();
    assert_eq!(
        chat.messages()[0].body,
        MessageBody::Subscribe {
            inviter: jacob,
            invitees: vec![joseph, mary]
        }
    );
}

#[test]
fn test_unsubscribe() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({
        "sender_name": "Joseph",
        "type": "Unsubscribe",
        "content": "Joseph left the group.",
        "users": [{"name": "Joseph"}]
    }));
    spoof.push_json(json!({
        "sender_name": "Jacob",
        "type": "Unsubscribe",
        "content": "Jacob removed Mary from the group.",
        "users": [{"name": "Mary"}]
    }));
    spoof.push_json(json!({
        "sender_name": "Jacob",
        "type": "Unsubscribe",
        "content": "Jacob removed a participant from the group.",
        "users": []
    }));

    let mut chat = spoof.build(OWNER);
    let joseph = chat.get_participant("Joseph").id();
    let jacob = chat.get_participant("Jacob").id();
    let mary = chat.get_participant("Mary").id();
    let unknown = chat.unknown_participant().id();

    let bodies = bodies(&chat);
    assert_eq!(
        bodies[0],
        MessageBody::Unsubscribe {
            removed_self: true,
            removalist: joseph,
            removed: joseph
        }
    );
    assert_eq!(
        bodies[1],
        MessageBody::Unsubscribe {
            removed_self: false,
            removalist: jacob,
            removed: mary
        }
    );
    assert_eq!(
        bodies[2],
        MessageBody::Unsubscribe {
            removed_self: false,
            removalist: jacob,
            removed: unknown
        }
    );
}

#[test]
fn test_link_share() {
    let mut spoof = Spoof::new();
    spoof.push_json(json!({
        "type": "Share",
        "content": "https://example.com/article",
        "share": {"link": "https://example.com/article"}
    }));
    spoof.push_json(json!({
        "type": "Share",
        "content": "John sent a link."
    }));

    let chat = spoof.build(OWNER);
    assert_eq!(
        chat.messages()[0].body,
        MessageBody::Link {
            url: Some("https://example.com/article".into())
        }
    );
    assert_eq!(chat.messages()[1].body, MessageBody::Link { url: None });
}

// =========================================================================
// Reactions
// =========================================================================

#[test]
fn test_reaction_resolves_to_participant() {
    let mut spoof = Spoof::new();
    spoof.push(
        RawRecord::new(OWNER, 0)
            .with_type("Generic")
            .with_content("Funny, right?")
            .with_reaction("Bob", "😂"),
    );
    spoof.said_by("Bob", "Yes");

    let mut chat = spoof.build(OWNER);
    let reactions = chat.messages()[0].reactions().to_vec();
    let bob_reply = chat.messages()[1].sender();
    let bob = chat.get_participant("Bob").id();

    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].emoji, "😂");
    assert_eq!(reactions[0].sender, bob);
    assert_eq!(bob_reply, bob);
}

//! The built-in rule catalogue for Messenger exports.
//!
//! Order is load-bearing. Broadly: structural rules (attachments, missing
//! content) first, then system sentences gated on conversation state, then
//! stateless system sentences, and finally the type-discriminated catch-alls
//! (text, subscribe, unsubscribe, link).

use crate::classifier::ConversationState;
use crate::media::MediaBundle;
use crate::message::{CallType, MessageBody, SettingsChange};
use crate::raw::RawRecord;
use crate::tokens::Slot;

use super::{Extraction, Rule};

/// Returns the standard rules in evaluation order.
pub fn standard_rules() -> Vec<Rule> {
    vec![
        // Attachments win over everything, including captions that happen to
        // read like system sentences.
        Rule::new("media", media).when(has_media),
        Rule::new("empty", empty).when(no_content),
        // Calls
        Rule::new("call.start.video", call_start_video)
            .when(call_idle)
            .matching(r"{sender} started a video chat\."),
        Rule::new("call.start.audio", call_start_audio)
            .when(call_idle)
            .matching(r"{sender} started a call\."),
        Rule::new("call.join.video", call_join_video)
            .when(call_active)
            .matching(r"{sender} joined the video chat\."),
        Rule::new("call.join.audio", call_join_audio)
            .when(call_active)
            .matching(r"{sender} joined the call\."),
        Rule::new("call.share_video", call_share_video)
            .when(call_active)
            .matching(r"{sender} started sharing video\."),
        Rule::new("call.end.video", call_end_video)
            .when(call_active)
            .matching(r"The video chat ended\."),
        Rule::new("call.end.audio", call_end_audio)
            .when(call_active)
            .matching(r"The call ended\."),
        // Nicknames
        Rule::new("nickname.clear_own", nickname_clear_own)
            .matching(r"{sender} cleared (?:his|her|their) own nickname\."),
        Rule::new("nickname.clear_owner", nickname_clear_owner)
            .matching(r"{sender} cleared your nickname\."),
        Rule::new("nickname.clear_other", nickname_clear_other)
            .matching("{sender} cleared the nickname for {participant}"),
        Rule::new("nickname.set_other", nickname_set_other)
            .matching("{sender} set the nickname for {participant} to {anything}"),
        Rule::new("nickname.set_owner", nickname_set_owner)
            .matching("{sender} set your nickname to {anything}"),
        Rule::new("nickname.set_own", nickname_set_own)
            .matching("{sender} set (?:his|her|their) own nickname to {anything}"),
        // Chat settings
        Rule::new("settings.name", settings_name).matching("{sender} named the group {anything}"),
        Rule::new("settings.photo", settings_photo)
            .matching(r"{sender} changed the group photo\."),
        Rule::new("settings.theme", settings_theme)
            .matching(r"{sender} changed the chat theme\."),
        Rule::new("settings.emoji", settings_emoji).matching("{sender} set the emoji to {emoji}"),
        Rule::new("settings.approval_on", settings_approval_on).matching(
            r"{sender} turned on member approval and will review requests to join the group\.",
        ),
        Rule::new("settings.approval_off", settings_approval_off).matching(
            r"{sender} turned off member approval\. Anyone with the link can join the group\.",
        ),
        // Plans
        Rule::new("plan.create", plan_create)
            .when(plan_idle)
            .matching(r"{sender} started a plan\."),
        Rule::new("plan.rename", plan_rename)
            .when(plan_active)
            .matching("{sender} named the plan {anything}"),
        Rule::new("plan.reschedule", plan_reschedule)
            .when(plan_active)
            .matching("{sender} updated the plan to {plan_date_time}"),
        // Titled first: "deleted the plan for fun for Sat" also satisfies the
        // untitled form.
        Rule::new("plan.delete.titled", plan_delete_titled)
            .when(plan_active)
            .matching("{sender} deleted the plan {plan_title} for {plan_date_time}"),
        Rule::new("plan.delete.untitled", plan_delete_untitled)
            .when(plan_active)
            .matching("{sender} deleted the plan for {plan_date_time}"),
        Rule::new("plan.respond", plan_respond)
            .when(plan_active)
            .matching("{sender} responded "),
        Rule::new("plan.remind.upcoming", plan_remind_upcoming)
            .when(plan_active)
            .matching(r"Reminder, 30 minutes until {plan_time}\."),
        Rule::new("plan.remind.upcoming_titled", plan_remind_upcoming_titled)
            .when(plan_active)
            .matching("Reminder, 30 minutes until {plan_title} at {plan_time}"),
        Rule::new("plan.remind.now", plan_remind_now)
            .when(plan_active)
            .matching(r"Reminder at {plan_time}\."),
        Rule::new("plan.remind.now_titled", plan_remind_now_titled)
            .when(plan_active)
            .matching("Reminder, {plan_title} at {plan_time}"),
        // Polls. Multi-option votes first: the single-option templates would
        // otherwise swallow the "and N other options" tail into the option.
        Rule::new("poll.create", poll_create).matching("{sender} created a poll: {anything}"),
        Rule::new("poll.vote.add_multi", poll_add_vote_multi).matching(
            r#"{sender} voted for "{poll_option}" and {number} other options? in the poll: {poll_name}"#,
        ),
        Rule::new("poll.vote.add", poll_add_vote)
            .matching(r#"{sender} voted for "{poll_option}" in the poll: {poll_name}"#),
        Rule::new("poll.vote.remove_multi", poll_remove_vote_multi).matching(
            r#"{sender} removed (?:your |his |her |their )?vote for "{poll_option}" and {number} other options? in the poll: {poll_name}"#,
        ),
        Rule::new("poll.vote.remove", poll_remove_vote).matching(
            r#"{sender} removed (?:your |his |her |their )?vote for "{poll_option}" in the poll: {poll_name}"#,
        ),
        Rule::new("poll.vote.change", poll_change_vote).matching(
            r#"{sender} changed (?:your |his |her |their )?vote to "{poll_option}" in the poll: {poll_name}"#,
        ),
        Rule::new("poll.expired", poll_expired).matching(r"This poll is no longer available\."),
        // Admins
        Rule::new("admin.add", admin_add)
            .matching(r"{sender} added {participant} as a group admin\."),
        Rule::new("admin.remove", admin_remove)
            .matching(r"{sender} removed {participant} as a group admin\."),
        // Third-party apps
        Rule::new("app.score", app_score).matching(
            "{sender}(?: just)? scored {app_score} (?:point |points )?(?:in|playing) {app_name}",
        ),
        Rule::new("app.personal_best", app_personal_best).matching(
            "{sender} set a new personal best of {app_score} (?:point |points )?(?:in|playing) {app_name}",
        ),
        Rule::new("app.leaderboard.up", app_leaderboard_up)
            .matching("{sender} moved up the leaderboard in {app_name}"),
        Rule::new("app.leaderboard.first", app_leaderboard_first)
            .matching("{sender} is now in first place in {app_name}"),
        Rule::new("app.challenge", app_challenge)
            .matching("{sender} challenged you in {app_name}"),
        Rule::new("wave", wave).matching(r"{first_name} waved hello to the group\."),
        // Type-discriminated catch-alls
        Rule::new("text", text).when(is_plain),
        Rule::new("subscribe", subscribe).when(is_subscribe),
        Rule::new("unsubscribe.self", unsubscribe_self)
            .when(is_unsubscribe)
            .matching(r"{participant} left the group\."),
        Rule::new("unsubscribe.removed", unsubscribe_removed).when(is_unsubscribe),
        Rule::new("link", link).when(is_share),
    ]
}

// ============================================================================
// Guards
// ============================================================================

fn has_media(record: &RawRecord, _: &ConversationState) -> bool {
    record.has_media()
}

fn no_content(record: &RawRecord, _: &ConversationState) -> bool {
    record.content.is_none()
}

fn call_idle(_: &RawRecord, state: &ConversationState) -> bool {
    !state.call_active
}

fn call_active(_: &RawRecord, state: &ConversationState) -> bool {
    state.call_active
}

fn plan_idle(_: &RawRecord, state: &ConversationState) -> bool {
    !state.plan_active
}

fn plan_active(_: &RawRecord, state: &ConversationState) -> bool {
    state.plan_active
}

fn is_plain(record: &RawRecord, _: &ConversationState) -> bool {
    matches!(record.record_type(), None | Some("Generic")) && record.share.is_none()
}

fn is_subscribe(record: &RawRecord, _: &ConversationState) -> bool {
    record.is_type("Subscribe") && record.users.is_some()
}

fn is_unsubscribe(record: &RawRecord, _: &ConversationState) -> bool {
    record.is_type("Unsubscribe")
}

fn is_share(record: &RawRecord, _: &ConversationState) -> bool {
    record.is_type("Share") || record.share.is_some()
}

// ============================================================================
// Extractors
// ============================================================================

fn media(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::Media(MediaBundle::extract(x.record))
}

fn empty(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::Empty
}

fn text(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::Text
}

fn wave(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::Wave
}

fn link(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::Link {
        url: x.record.share.as_ref().and_then(|share| share.link.clone()),
    }
}

// Calls

fn start_call(x: &mut Extraction<'_>, call_type: CallType) -> MessageBody {
    x.state.call_active = true;
    MessageBody::CallStart {
        call_type,
        duration_secs: x.record.call_duration,
    }
}

fn end_call(x: &mut Extraction<'_>, call_type: CallType) -> MessageBody {
    x.state.call_active = false;
    MessageBody::CallEnd {
        call_type,
        duration_secs: x.record.call_duration,
    }
}

fn call_start_video(x: &mut Extraction<'_>) -> MessageBody {
    start_call(x, CallType::Video)
}

fn call_start_audio(x: &mut Extraction<'_>) -> MessageBody {
    start_call(x, CallType::Audio)
}

fn call_join_video(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::CallJoin {
        call_type: CallType::Video,
    }
}

fn call_join_audio(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::CallJoin {
        call_type: CallType::Audio,
    }
}

fn call_share_video(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::CallShareVideo
}

fn call_end_video(x: &mut Extraction<'_>) -> MessageBody {
    end_call(x, CallType::Video)
}

fn call_end_audio(x: &mut Extraction<'_>) -> MessageBody {
    end_call(x, CallType::Audio)
}

// Nicknames

fn nickname_clear_own(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::NicknameChange {
        setter: x.sender,
        subject: x.sender,
        new_nickname: None,
    }
}

fn nickname_clear_owner(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::NicknameChange {
        setter: x.sender,
        subject: x.owner(),
        new_nickname: None,
    }
}

fn nickname_clear_other(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::NicknameChange {
        setter: x.sender,
        subject: x.resolve_capture(Slot::Participant),
        new_nickname: None,
    }
}

fn nickname_set_other(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::NicknameChange {
        setter: x.sender,
        subject: x.resolve_capture(Slot::Participant),
        new_nickname: Some(x.capture(Slot::Anything)),
    }
}

fn nickname_set_owner(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::NicknameChange {
        setter: x.sender,
        subject: x.owner(),
        new_nickname: Some(x.capture(Slot::Anything)),
    }
}

fn nickname_set_own(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::NicknameChange {
        setter: x.sender,
        subject: x.sender,
        new_nickname: Some(x.capture(Slot::Anything)),
    }
}

// Chat settings

fn settings_name(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::ChatSettingsChange(SettingsChange::Name(x.capture(Slot::Anything)))
}

fn settings_photo(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::ChatSettingsChange(SettingsChange::Photo)
}

fn settings_theme(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::ChatSettingsChange(SettingsChange::Theme)
}

fn settings_emoji(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::ChatSettingsChange(SettingsChange::Emoji(x.capture(Slot::Emoji)))
}

fn settings_approval_on(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::ChatSettingsChange(SettingsChange::MemberApproval(true))
}

fn settings_approval_off(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::ChatSettingsChange(SettingsChange::MemberApproval(false))
}

// Plans

fn plan_create(x: &mut Extraction<'_>) -> MessageBody {
    x.state.plan_active = true;
    MessageBody::PlanCreation {
        title: x.record.plan.as_ref().and_then(|plan| plan.title.clone()),
    }
}

fn plan_rename(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PlanUpdate {
        new_title: Some(x.capture(Slot::Anything)),
        new_date_time: None,
    }
}

fn plan_reschedule(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PlanUpdate {
        new_title: None,
        new_date_time: Some(x.capture(Slot::PlanDateTime)),
    }
}

fn plan_delete_titled(x: &mut Extraction<'_>) -> MessageBody {
    x.state.plan_active = false;
    MessageBody::PlanDeletion {
        title: Some(x.capture(Slot::PlanTitle)),
        date_time: x.capture(Slot::PlanDateTime),
    }
}

fn plan_delete_untitled(x: &mut Extraction<'_>) -> MessageBody {
    x.state.plan_active = false;
    MessageBody::PlanDeletion {
        title: None,
        date_time: x.capture(Slot::PlanDateTime),
    }
}

fn plan_respond(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PlanResponse
}

fn reminder(x: &mut Extraction<'_>, is_concurrent: bool, titled: bool) -> MessageBody {
    if is_concurrent {
        x.state.plan_active = false;
    }
    MessageBody::PlanReminder {
        is_concurrent,
        title: titled.then(|| x.capture(Slot::PlanTitle)),
        hour: x.capture(Slot::PlanTime),
    }
}

fn plan_remind_upcoming(x: &mut Extraction<'_>) -> MessageBody {
    reminder(x, false, false)
}

fn plan_remind_upcoming_titled(x: &mut Extraction<'_>) -> MessageBody {
    reminder(x, false, true)
}

fn plan_remind_now(x: &mut Extraction<'_>) -> MessageBody {
    reminder(x, true, false)
}

fn plan_remind_now_titled(x: &mut Extraction<'_>) -> MessageBody {
    reminder(x, true, true)
}

// Polls

/// The poll sub-object's title, when present, is authoritative.
fn poll_name(x: &Extraction<'_>, slot: Slot) -> String {
    x.record
        .poll
        .as_ref()
        .and_then(|poll| poll.title.clone())
        .unwrap_or_else(|| x.capture(slot))
}

fn hidden_votes(x: &Extraction<'_>) -> u32 {
    x.captures
        .get(Slot::Number)
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn poll_create(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PollCreation {
        name: poll_name(x, Slot::Anything),
    }
}

fn poll_add_vote_multi(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PollAddVote {
        poll_name: poll_name(x, Slot::PollName),
        option: x.capture(Slot::PollOption),
        hidden_vote_count: hidden_votes(x),
    }
}

fn poll_add_vote(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PollAddVote {
        poll_name: poll_name(x, Slot::PollName),
        option: x.capture(Slot::PollOption),
        hidden_vote_count: 0,
    }
}

fn poll_remove_vote_multi(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PollRemoveVote {
        poll_name: poll_name(x, Slot::PollName),
        option: x.capture(Slot::PollOption),
        hidden_vote_count: hidden_votes(x),
    }
}

fn poll_remove_vote(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PollRemoveVote {
        poll_name: poll_name(x, Slot::PollName),
        option: x.capture(Slot::PollOption),
        hidden_vote_count: 0,
    }
}

fn poll_change_vote(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PollChangeVote {
        poll_name: poll_name(x, Slot::PollName),
        option: x.capture(Slot::PollOption),
    }
}

fn poll_expired(_: &mut Extraction<'_>) -> MessageBody {
    MessageBody::PollExpired
}

// Admins

fn admin_add(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::AdminAdd {
        instigator: x.sender,
        subject: x.resolve_capture(Slot::Participant),
    }
}

fn admin_remove(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::AdminRemove {
        instigator: x.sender,
        subject: x.resolve_capture(Slot::Participant),
    }
}

// Apps

fn app_score(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::AppScore {
        app_name: x.capture(Slot::AppName),
        score: x.capture(Slot::AppScore),
        personal_best: false,
    }
}

fn app_personal_best(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::AppScore {
        app_name: x.capture(Slot::AppName),
        score: x.capture(Slot::AppScore),
        personal_best: true,
    }
}

fn app_leaderboard_up(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::AppLeaderboard {
        app_name: x.capture(Slot::AppName),
        now_in_first_place: false,
    }
}

fn app_leaderboard_first(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::AppLeaderboard {
        app_name: x.capture(Slot::AppName),
        now_in_first_place: true,
    }
}

fn app_challenge(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::AppChallenge {
        app_name: x.capture(Slot::AppName),
    }
}

// Membership

fn subscribe(x: &mut Extraction<'_>) -> MessageBody {
    let record = x.record;
    let invitees = record
        .user_names()
        .into_iter()
        .flatten()
        .map(|name| x.participants.resolve(name))
        .collect();
    MessageBody::Subscribe {
        inviter: x.sender,
        invitees,
    }
}

fn unsubscribe_self(x: &mut Extraction<'_>) -> MessageBody {
    MessageBody::Unsubscribe {
        removed_self: true,
        removalist: x.sender,
        removed: x.sender,
    }
}

fn unsubscribe_removed(x: &mut Extraction<'_>) -> MessageBody {
    let record = x.record;
    let removed = match record.user_names().and_then(|mut names| names.next()) {
        Some(name) => x.resolve(name),
        None => x.unknown(),
    };
    MessageBody::Unsubscribe {
        removed_self: false,
        removalist: x.sender,
        removed,
    }
}

//! Integration test: narrative round trips
//!
//! Tests the narrative loop end to end: story history becomes a request,
//! a backend streams text back, and the detectors turn that text into gold,
//! exp, AP and quest completions.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use saga::character::{CharacterClass, Gender};
use saga::combat::{perform_action, return_to_adventure, start_combat, GenerationOptions, PlayerAction};
use saga::error::{GameError, NarrativeError};
use saga::narrative::{NarrativeBackend, NarrativeEvent, NarrativeRequest, Role};
use saga::{Attributes, GameData, GameState};

// =============================================================================
// Helpers
// =============================================================================

fn create_test_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(11)
}

fn new_state(data: &GameData) -> GameState {
    GameState::new_game(
        "白鹭".to_string(),
        CharacterClass::Mage,
        Gender::Female,
        data,
    )
    .unwrap()
}

/// Replies with a queue of canned texts and keeps every request it saw.
struct QueueBackend {
    replies: Vec<&'static str>,
    requests: Vec<NarrativeRequest>,
}

impl QueueBackend {
    fn new(replies: Vec<&'static str>) -> Self {
        Self {
            replies,
            requests: Vec::new(),
        }
    }
}

impl NarrativeBackend for QueueBackend {
    fn stream(
        &mut self,
        request: &NarrativeRequest,
        on_update: &mut dyn FnMut(&str),
    ) -> Result<String, NarrativeError> {
        self.requests.push(request.clone());
        if self.replies.is_empty() {
            return Err(NarrativeError::Backend("no more replies".to_string()));
        }
        let reply = self.replies.remove(0);
        on_update(reply);
        Ok(reply.to_string())
    }
}

// =============================================================================
// Conversation flow
// =============================================================================

#[test]
fn test_conversation_alternates_roles() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    let mut backend = QueueBackend::new(vec!["你走出了村子。", "森林里很安静。"]);

    state
        .generate_narrative("出发", 1024, &mut backend, &mut rng, &data)
        .unwrap();
    state
        .generate_narrative("进入森林", 1024, &mut backend, &mut rng, &data)
        .unwrap();

    assert_eq!(state.story_log.len(), 4);
    let second = &backend.requests[1];
    let roles: Vec<Role> = second.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    assert_eq!(second.messages[2].content, "进入森林");
    assert_eq!(second.max_tokens, 1024);
}

#[test]
fn test_combat_summary_merges_with_next_input() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    state.character.base_stats = Attributes::new(400, 50, 50, 50, 50);

    start_combat(&mut state, &data, GenerationOptions::default(), &mut rng).unwrap();
    perform_action(&mut state, &data, PlayerAction::Attack, &mut rng).unwrap();
    let summary = return_to_adventure(&mut state, &data).unwrap().unwrap();

    let mut backend = QueueBackend::new(vec!["你收起武器，继续赶路。"]);
    state
        .generate_narrative("我继续前进", 1024, &mut backend, &mut rng, &data)
        .unwrap();

    let request = &backend.requests[0];
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, Role::User);
    assert_eq!(
        request.messages[0].content,
        format!("{}\n\n我继续前进", summary)
    );
}

#[test]
fn test_dialogue_recovers_ap() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    state.character.current_ap = 50;
    let mut backend = QueueBackend::new(vec!["风吹过麦田。"]);

    let effects = state
        .generate_narrative("四处看看", 1024, &mut backend, &mut rng, &data)
        .unwrap();

    assert!(effects.events.is_empty());
    assert_eq!(
        state.character.current_ap,
        50 + data.balance.ap.dialogue_recovery
    );
}

#[test]
fn test_backend_failure_can_be_retried() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    let mut backend = QueueBackend::new(Vec::new());

    let err = state
        .generate_narrative("你好", 1024, &mut backend, &mut rng, &data)
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::Narrative(NarrativeError::Backend(_))
    ));
    assert_eq!(state.story_log.len(), 1);
    assert!(!state.is_generating);

    backend.replies.push("旅店老板向你点头。");
    state
        .generate_narrative("你好", 1024, &mut backend, &mut rng, &data)
        .unwrap();
    assert_eq!(state.story_log.len(), 3);
    assert_eq!(state.story_log[2].role, Role::Assistant);
}

#[test]
fn test_generation_already_running_is_rejected() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    state.is_generating = true;
    let mut backend = QueueBackend::new(vec!["不会发送"]);

    let err = state
        .generate_narrative("你好", 1024, &mut backend, &mut rng, &data)
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::Narrative(NarrativeError::AlreadyGenerating)
    ));
    assert!(backend.requests.is_empty());
    assert!(state.story_log.is_empty());
}

// =============================================================================
// Quests and events
// =============================================================================

#[test]
fn test_quest_rewards_paid_once() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    let gold_before = state.character.gold;
    let mut backend = QueueBackend::new(vec![
        "你在溪边采集了一大把草药。",
        "你又采集了一些草药。",
    ]);

    let first = state
        .generate_narrative("去采药", 1024, &mut backend, &mut rng, &data)
        .unwrap();
    let second = state
        .generate_narrative("再采一些", 1024, &mut backend, &mut rng, &data)
        .unwrap();

    assert_eq!(first.quests.completed_quest_ids, vec!["quest_herbs".to_string()]);
    assert_eq!(first.quests.gold_reward, 40);
    assert!(second.quests.is_empty());
    assert_eq!(state.character.gold, gold_before + 40);
    assert!(state.character.completed_quests.contains(&"quest_herbs".to_string()));
}

#[test]
fn test_one_text_completes_several_quests() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);

    let effects = state.apply_narrative_text(
        "你击败了野狼，又在狼窝里找到了旧钥匙。",
        &mut rng,
        &data,
    );

    let mut ids = effects.quests.completed_quest_ids.clone();
    ids.sort();
    assert_eq!(ids, vec!["quest_lost_key".to_string(), "quest_wolf".to_string()]);
    assert_eq!(effects.quests.gold_reward, 110);
    assert_eq!(effects.quests.notifications.len(), 2);
}

#[test]
fn test_defeat_text_grants_nothing() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    let exp_before = state.character.exp;

    let effects = state.apply_narrative_text("你被强盗击败了，倒在路边。", &mut rng, &data);

    assert!(effects.events.contains(&NarrativeEvent::Defeat));
    assert!(!effects.events.contains(&NarrativeEvent::Victory));
    assert_eq!(effects.exp_gained, 0);
    assert_eq!(state.character.exp, exp_before);
}

#[test]
fn test_rest_text_recovers_ap() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    state.character.current_ap = 40;

    let effects = state.apply_narrative_text("你在篝火旁休息了一夜。", &mut rng, &data);

    assert_eq!(effects.events, vec![NarrativeEvent::Rest]);
    assert_eq!(
        state.character.current_ap,
        40 + data.balance.ap.dialogue_recovery
    );
    assert!(state.autosave_pending);
}

#[test]
fn test_plain_text_changes_nothing() {
    let data = GameData::standard().unwrap();
    let mut rng = create_test_rng();
    let mut state = new_state(&data);
    let before = state.clone();

    let effects = state.apply_narrative_text("夕阳西下，炊烟袅袅。", &mut rng, &data);

    assert!(effects.events.is_empty());
    assert!(effects.quests.is_empty());
    assert_eq!(state, before);
}

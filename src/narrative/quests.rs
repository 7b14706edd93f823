//! Quest completion detection.
//!
//! Each quest lists alternative patterns; any one matching the narrative
//! text completes the quest if it is active. Same caveats as the event
//! detector: negated phrasing ("你没能击败史莱姆") still matches.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DataError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub patterns: Vec<String>,
    pub gold_reward: u32,
}

impl QuestDefinition {
    fn new(id: &str, title: &str, description: &str, patterns: &[&str], gold_reward: u32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            gold_reward,
        }
    }
}

pub fn standard_quests() -> Vec<QuestDefinition> {
    vec![
        QuestDefinition::new(
            "quest_slime",
            "史莱姆清理",
            "村外的史莱姆越来越多了，去消灭它们。",
            &[r"(?:击败|打败|消灭|击杀|战胜)了?.{0,6}史莱姆"],
            50,
        ),
        QuestDefinition::new(
            "quest_wolf",
            "狼群的威胁",
            "猎人说森林里的狼群开始袭击旅人。",
            &[
                r"(?:击败|打败|消灭|击杀|赶走)了?.{0,6}(?:狼群|野狼|狼王)",
                r"狼群.{0,6}(?:四散而逃|被驱散)",
            ],
            80,
        ),
        QuestDefinition::new(
            "quest_lost_key",
            "遗失的钥匙",
            "旅店老板弄丢了地窖的旧钥匙。",
            &[r"(?:找到|找回|捡到|发现)了?.{0,6}(?:旧钥匙|地窖钥匙)"],
            30,
        ),
        QuestDefinition::new(
            "quest_herbs",
            "草药采集",
            "村里的药师需要新鲜的草药。",
            &[r"(?:采集|采到|收集|摘到)了?.{0,8}草药"],
            40,
        ),
    ]
}

/// Result of scanning one narrative text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestCompletion {
    pub completed_quest_ids: Vec<String>,
    pub gold_reward: u32,
    /// Player-facing lines, one per completed quest.
    pub notifications: Vec<String>,
}

impl QuestCompletion {
    pub fn is_empty(&self) -> bool {
        self.completed_quest_ids.is_empty()
    }
}

#[derive(Debug, Clone)]
struct CompiledQuest {
    definition: QuestDefinition,
    patterns: Vec<Regex>,
}

/// Quest definitions with their patterns compiled.
#[derive(Debug, Clone)]
pub struct QuestBook {
    quests: Vec<CompiledQuest>,
}

impl QuestBook {
    pub fn new(definitions: &[QuestDefinition]) -> Result<Self, DataError> {
        let mut quests = Vec::with_capacity(definitions.len());
        for def in definitions {
            let patterns = def
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|e| DataError::InvalidQuestPattern {
                        quest_id: def.id.clone(),
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            quests.push(CompiledQuest {
                definition: def.clone(),
                patterns,
            });
        }
        Ok(Self { quests })
    }

    pub fn get(&self, quest_id: &str) -> Option<&QuestDefinition> {
        self.quests
            .iter()
            .map(|q| &q.definition)
            .find(|d| d.id == quest_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.quests.iter().map(|q| q.definition.id.as_str())
    }

    /// Active quests whose patterns match `text`, in definition order.
    pub fn detect_quest_completion(&self, text: &str, active_ids: &[String]) -> QuestCompletion {
        let mut completion = QuestCompletion::default();
        for quest in &self.quests {
            let def = &quest.definition;
            if !active_ids.iter().any(|id| *id == def.id) {
                continue;
            }
            if quest.patterns.iter().any(|p| p.is_match(text)) {
                info!(quest = %def.id, gold = def.gold_reward, "quest completed");
                completion.completed_quest_ids.push(def.id.clone());
                completion.gold_reward = completion.gold_reward.saturating_add(def.gold_reward);
                completion
                    .notifications
                    .push(format!("任务完成：{}（获得 {} 金币）", def.title, def.gold_reward));
            }
        }
        completion
    }
}

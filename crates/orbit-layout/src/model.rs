use crate::theme::Color;
use derive_more::{AsRef, Deref, Display, From, Into};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct GroupId(String);

crate::impl_string_newtype!(GroupId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemId(String);

crate::impl_string_newtype!(ItemId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CenterId(String);

crate::impl_string_newtype!(CenterId);

/// Item ids are only unique inside their group, so hover and selection key on
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{group}/{item}")]
pub struct ItemKey {
    pub group: GroupId,
    pub item: ItemId,
}

impl ItemKey {
    pub fn new(group: impl Into<GroupId>, item: impl Into<ItemId>) -> Self {
        Self {
            group: group.into(),
            item: item.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub label: String,
    pub value: f64,
    #[serde(
        default,
        deserialize_with = "crate::theme::lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Color>,
    #[serde(default)]
    pub glow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub meta: IndexMap<String, serde_json::Value>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, label: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value,
            color: None,
            glow: false,
            icon_url: None,
            meta: IndexMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub label: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(
        default,
        deserialize_with = "crate::theme::lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Color>,
}

impl Group {
    pub fn new(id: impl Into<GroupId>, label: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            items,
            radius: None,
            color: None,
        }
    }

    pub fn find_item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Center {
    pub id: CenterId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Center {
    pub fn new(id: impl Into<CenterId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            subtitle: None,
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub center: Center,
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("duplicate group id '{0}'")]
    DuplicateGroup(GroupId),
    #[error("duplicate item id '{0}'")]
    DuplicateItem(ItemKey),
}

impl Dataset {
    pub fn new(center: Center, groups: Vec<Group>) -> Self {
        Self { center, groups }
    }

    /// Rejects datasets whose group ids, or item ids within a group, repeat.
    /// Lookups on an unvalidated dataset resolve to the first match.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut groups = HashSet::new();
        for group in &self.groups {
            if !groups.insert(&group.id) {
                return Err(DatasetError::DuplicateGroup(group.id.clone()));
            }

            let mut items = HashSet::new();
            if let Some(dup) = group.items.iter().find(|item| !items.insert(&item.id)) {
                return Err(DatasetError::DuplicateItem(ItemKey::new(
                    group.id.clone(),
                    dup.id.clone(),
                )));
            }
        }
        Ok(())
    }

    pub fn find_group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.id == id)
    }

    pub fn find_item(&self, key: &ItemKey) -> Option<(&Item, &Group)> {
        let group = self.find_group(&key.group)?;
        group.find_item(&key.item).map(|item| (item, group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            Center::new("me", "Me"),
            vec![
                Group::new(
                    "tools",
                    "Tools",
                    vec![Item::new("a", "Alpha", 1.0), Item::new("b", "Beta", 2.0)],
                ),
                Group::new("apps", "Apps", vec![Item::new("a", "Other Alpha", 3.0)]),
            ],
        )
    }

    #[test]
    fn test_dataset_deserialization() {
        let json = r##"{
            "center": { "id": "me", "label": "Me", "avatarUrl": "me.png" },
            "groups": [{
                "id": "finance",
                "label": "Finance",
                "color": "#10b981",
                "items": [{
                    "id": "ledger",
                    "label": "Ledger",
                    "value": 42,
                    "glow": true,
                    "iconUrl": "ledger.png",
                    "meta": { "owner": "ops", "seats": 12 }
                }]
            }]
        }"##;

        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.center.avatar_url.as_deref(), Some("me.png"));

        let group = &dataset.groups[0];
        assert_eq!(group.id, "finance");
        assert_eq!(group.color.unwrap().to_string(), "#10b981");

        let item = &group.items[0];
        assert_eq!(item.value, 42.0);
        assert!(item.glow);
        assert_eq!(item.icon_url.as_deref(), Some("ledger.png"));
        let keys: Vec<_> = item.meta.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["owner", "seats"]);
    }

    #[test]
    fn test_unusual_colors_degrade_instead_of_failing() {
        let json = r##"{
            "center": { "id": "me", "label": "Me" },
            "groups": [{
                "id": "g",
                "label": "G",
                "color": "hsl(160, 84%, 39%)",
                "items": [
                    { "id": "a", "label": "A", "value": 1, "color": "purple" },
                    { "id": "b", "label": "B", "value": 2, "color": "rgb(16 185 129)" },
                    { "id": "c", "label": "C", "value": 3, "color": "sparkly" }
                ]
            }]
        }"##;

        let dataset: Dataset = serde_json::from_str(json).unwrap();
        let group = &dataset.groups[0];
        assert!(group.color.is_some());

        let colors: Vec<Option<String>> = group
            .items
            .iter()
            .map(|item| item.color.map(|c| c.to_string()))
            .collect();
        assert_eq!(
            colors,
            vec![Some("#800080".to_string()), Some("#10b981".to_string()), None]
        );
    }

    #[test]
    fn test_item_ids_may_repeat_across_groups() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut dataset = sample();
        dataset.groups[0].items.push(Item::new("b", "Beta again", 5.0));
        assert_eq!(
            dataset.validate(),
            Err(DatasetError::DuplicateItem(ItemKey::new("tools", "b")))
        );

        let mut dataset = sample();
        dataset.groups.push(Group::new("apps", "Apps 2", vec![]));
        assert_eq!(
            dataset.validate(),
            Err(DatasetError::DuplicateGroup(GroupId::new("apps")))
        );
    }

    #[test]
    fn test_lookups_resolve_first_match() {
        let mut dataset = sample();
        dataset.groups.push(Group::new("apps", "Shadowed", vec![]));

        let group = dataset.find_group(&GroupId::new("apps")).unwrap();
        assert_eq!(group.label, "Apps");

        let (item, group) = dataset.find_item(&ItemKey::new("apps", "a")).unwrap();
        assert_eq!(item.label, "Other Alpha");
        assert_eq!(group.label, "Apps");
    }
}

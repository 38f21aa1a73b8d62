// 偏好数据 - 带类型键的键值映射

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// 存储值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    Int(i32),
    Long(i64),
    Bool(bool),
    String(String),
    StringSet(BTreeSet<String>),
}

/// 可存入偏好映射的类型
pub trait PrefType: Sized {
    /// 从存储值读取；类型不符时返回 None
    fn from_value(value: &PrefValue) -> Option<Self>;
    fn into_value(self) -> PrefValue;
}

impl PrefType for i32 {
    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> PrefValue {
        PrefValue::Int(self)
    }
}

impl PrefType for i64 {
    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> PrefValue {
        PrefValue::Long(self)
    }
}

impl PrefType for bool {
    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> PrefValue {
        PrefValue::Bool(self)
    }
}

impl PrefType for String {
    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> PrefValue {
        PrefValue::String(self)
    }
}

impl PrefType for BTreeSet<String> {
    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::StringSet(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> PrefValue {
        PrefValue::StringSet(self)
    }
}

/// 带类型的键
pub struct Key<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// 偏好映射快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    entries: BTreeMap<String, PrefValue>,
}

impl Preferences {
    pub fn get<T: PrefType>(&self, key: &Key<T>) -> Option<T> {
        self.entries.get(key.name()).and_then(T::from_value)
    }

    pub fn contains<T>(&self, key: &Key<T>) -> bool {
        self.entries.contains_key(key.name())
    }

    pub fn set<T: PrefType>(&mut self, key: &Key<T>, value: T) {
        self.entries.insert(key.name().to_string(), value.into_value());
    }

    /// 删除键，返回键是否存在
    pub fn remove<T>(&mut self, key: &Key<T>) -> bool {
        self.entries.remove(key.name()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

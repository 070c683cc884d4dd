use std::collections::{BTreeMap, BTreeSet};

use crate::collection::instance::RequestInstance;

/// 请求实例的有序集合，id 从 1 开始严格递增
#[derive(Debug, Clone)]
pub struct Collection {
    instances: BTreeMap<u64, RequestInstance>,
    next_id: u64,
    tags: BTreeSet<String>,
    suites: BTreeSet<String>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    pub fn new() -> Self {
        Self {
            instances: BTreeMap::new(),
            next_id: 1,
            tags: BTreeSet::new(),
            suites: BTreeSet::new(),
        }
    }

    /// 分配下一个 id 并加入集合
    pub fn append(&mut self, mut instance: RequestInstance) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        instance.id = id;
        self.tags
            .extend(instance.tags.iter().filter(|t| !t.is_empty()).cloned());
        if !instance.suite.is_empty() {
            self.suites.insert(instance.suite.clone());
        }
        self.instances.insert(id, instance);
        id
    }

    /// 选出同时带有全部 `tags` 且 suite 属于 `suites` 的实例 id，空条件不做限制
    pub fn filter(&self, tags: &[String], suites: &[String]) -> Vec<u64> {
        self.instances
            .values()
            .filter(|instance| tags.iter().all(|tag| instance.tags.contains(tag)))
            .filter(|instance| suites.is_empty() || suites.contains(&instance.suite))
            .map(|instance| instance.id)
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<&RequestInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut RequestInstance> {
        self.instances.get_mut(&id)
    }

    /// 按 id 升序
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &RequestInstance)> {
        self.instances.iter()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|s| s.as_str())
    }

    pub fn suites(&self) -> impl Iterator<Item = &str> {
        self.suites.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    fn tagged(name: &str, suite: &str, tags: &[&str]) -> RequestInstance {
        let mut instance = RequestInstance::new(name, Method::Get, "http://localhost/");
        instance.suite = suite.to_string();
        instance.tags = tags.iter().map(|t| t.to_string()).collect();
        instance
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Collection {
        let mut collection = Collection::new();
        collection.append(tagged("a", "users", &["smoke", "read"]));
        collection.append(tagged("b", "users", &["write"]));
        collection.append(tagged("c", "orders", &["smoke"]));
        collection
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut collection = Collection::new();
        assert_eq!(collection.append(tagged("a", "s", &[])), 1);
        assert_eq!(collection.append(tagged("b", "s", &[])), 2);
        assert_eq!(collection.get(2).unwrap().id(), 2);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_indexes() {
        let collection = sample();
        assert_eq!(collection.tags().collect::<Vec<_>>(), vec!["read", "smoke", "write"]);
        assert_eq!(collection.suites().collect::<Vec<_>>(), vec!["orders", "users"]);
    }

    #[test]
    fn test_filter() {
        let collection = sample();

        assert_eq!(collection.filter(&[], &[]), vec![1, 2, 3]);
        assert_eq!(collection.filter(&strings(&["smoke"]), &[]), vec![1, 3]);
        assert_eq!(collection.filter(&strings(&["smoke", "read"]), &[]), vec![1]);
        assert_eq!(collection.filter(&[], &strings(&["users"])), vec![1, 2]);
        assert_eq!(
            collection.filter(&strings(&["smoke"]), &strings(&["orders", "billing"])),
            vec![3]
        );
        assert!(collection.filter(&strings(&["missing"]), &[]).is_empty());
    }
}

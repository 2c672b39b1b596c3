/// Builds per-operation keys of the form `{prefix}{:tag}:{worker}:{op}`.
///
/// Worker ids are unique within a run and op indices are unique within a worker, so keys
/// never collide across workers.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    base: String,
}

impl KeyBuilder {
    #[must_use]
    pub fn new(prefix: &str, tag: Option<&str>) -> Self {
        let mut base = String::with_capacity(prefix.len() + tag.map_or(0, |t| t.len() + 1));
        base.push_str(prefix);
        if let Some(tag) = tag.filter(|t| !t.is_empty()) {
            base.push(':');
            base.push_str(tag);
        }
        Self { base }
    }

    #[must_use]
    pub fn key(&self, worker_id: u64, op_index: u64) -> String {
        format!("{}:{worker_id}:{op_index}", self.base)
    }
}

use super::error::KubeconfigError;
use crate::utils::{nullable, parse_document, read_optional, write_atomic};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Keys this model does not interpret; carried through reads and writes untouched.
pub type Extra = BTreeMap<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "nullable")]
    pub contexts: Vec<NamedContext>,
    #[serde(rename = "current-context", default, deserialize_with = "nullable")]
    pub current_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub users: Vec<NamedUser>,
    #[serde(flatten)]
    pub other: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub server: String,
    #[serde(
        rename = "certificate-authority-data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate_authority_data: Option<String>,
    #[serde(flatten)]
    pub other: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user: User,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecConfig>,
    #[serde(flatten)]
    pub other: Extra,
}

/// Client-go credential plugin invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecConfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<ExecEnvVar>>,
    #[serde(flatten)]
    pub other: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecEnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub cluster: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(flatten)]
    pub other: Extra,
}

pub trait Named {
    fn name(&self) -> &str;
}

impl Named for NamedCluster {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for NamedUser {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for NamedContext {
    fn name(&self) -> &str {
        &self.name
    }
}

fn find<'a, T: Named>(entries: &'a [T], name: &str) -> Option<&'a T> {
    entries.iter().find(|entry| entry.name() == name)
}

/// Replaces the entry carrying `entry`'s name in place, or appends it. Later duplicates of the
/// name are dropped so names stay unique.
fn upsert<T: Named>(entries: &mut Vec<T>, entry: T) {
    match entries.iter().position(|existing| existing.name() == entry.name()) {
        Some(idx) => {
            let name = entry.name().to_string();
            entries[idx] = entry;
            let mut seen = 0;
            entries.retain(|existing| {
                if existing.name() != name {
                    return true;
                }
                seen += 1;
                seen == 1
            });
        }
        None => entries.push(entry),
    }
}

impl Kubeconfig {
    /// `$HOME/.kube/config`
    pub fn default_path() -> Result<PathBuf, KubeconfigError> {
        let homedir = dirs::home_dir().ok_or(KubeconfigError::HomeDir)?;
        Ok(homedir.join(".kube").join("config"))
    }

    /// Reads the document at `path`. A missing file, or one without any content, is
    /// `NotConfigured`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Kubeconfig, KubeconfigError> {
        let path = path.as_ref();
        let content = read_optional(path)
            .map_err(|err| KubeconfigError::FileRead { path: path.into(), err })?
            .unwrap_or_default();
        let kubeconfig = parse_document::<Kubeconfig>(&content)
            .map_err(|err| KubeconfigError::FileDeserialize { path: path.into(), err })?
            .ok_or_else(|| KubeconfigError::NotConfigured { path: path.into() })?;
        log::debug!("read kubeconfig {}", path.display());
        Ok(kubeconfig)
    }

    pub fn to_yaml(&self) -> Result<String, KubeconfigError> {
        serde_yaml::to_string(self).map_err(KubeconfigError::Serialize)
    }

    /// Serializes the whole document and atomically replaces `path` with it.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), KubeconfigError> {
        let path = path.as_ref();
        let yaml = self.to_yaml()?;
        write_atomic(path, yaml.as_bytes()).map_err(|err| KubeconfigError::FileWrite { path: path.into(), err })?;
        log::debug!("wrote kubeconfig {}", path.display());
        Ok(())
    }

    pub fn cluster(&self, name: &str) -> Option<&NamedCluster> {
        find(&self.clusters, name)
    }

    pub fn user(&self, name: &str) -> Option<&NamedUser> {
        find(&self.users, name)
    }

    pub fn context(&self, name: &str) -> Option<&NamedContext> {
        find(&self.contexts, name)
    }

    /// The context named by `current-context`, if the pointer is set and resolves.
    pub fn current(&self) -> Option<&NamedContext> {
        if self.current_context.is_empty() {
            return None;
        }
        self.context(&self.current_context)
    }

    pub fn upsert_cluster(&mut self, cluster: NamedCluster) {
        upsert(&mut self.clusters, cluster)
    }

    pub fn upsert_context(&mut self, context: NamedContext) {
        upsert(&mut self.contexts, context)
    }

    /// Adds a user built by `make` unless one named `name` already exists. Returns whether a
    /// user was created.
    pub fn ensure_user<F: FnOnce() -> User>(&mut self, name: &str, make: F) -> bool {
        if self.user(name).is_some() {
            return false;
        }
        self.users.push(NamedUser {
            name: name.to_string(),
            user: make(),
        });
        true
    }

    /// Points `current-context` at `name`. The context must exist.
    pub fn set_current(&mut self, name: &str) -> Result<(), KubeconfigError> {
        if self.context(name).is_none() {
            return Err(KubeconfigError::MissingContext(name.to_string()));
        }
        self.current_context = name.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
preferences: {}
clusters:
- name: other
  cluster:
    server: https://other.example.com:6443
    certificate-authority-data: b3RoZXI=
    insecure-skip-tls-verify: false
users:
- name: other-user
  user:
    token: abc
contexts:
- name: other
  context:
    cluster: other
    user: other-user
    namespace: kube-system
current-context: other
"#;

    fn parse(content: &str) -> Kubeconfig {
        serde_yaml::from_str(content).unwrap()
    }

    fn named_context(name: &str) -> NamedContext {
        NamedContext {
            name: name.to_string(),
            context: Context {
                cluster: name.to_string(),
                user: name.to_string(),
                namespace: None,
                other: Extra::new(),
            },
        }
    }

    #[test]
    fn parses_and_keeps_unknown_keys() {
        let doc = parse(KUBECONFIG);

        assert_eq!(doc.current().unwrap().name, "other");
        assert!(doc.other.contains_key("preferences"));
        let cluster = &doc.cluster("other").unwrap().cluster;
        assert_eq!(cluster.certificate_authority_data.as_deref(), Some("b3RoZXI="));
        assert_eq!(cluster.other.get("insecure-skip-tls-verify"), Some(&Value::Bool(false)));
        assert!(doc.user("other-user").unwrap().user.other.contains_key("token"));
        assert_eq!(doc.context("other").unwrap().context.namespace.as_deref(), Some("kube-system"));
    }

    #[test]
    fn serialization_is_a_fixpoint() {
        let doc = parse(KUBECONFIG);
        let once = doc.to_yaml().unwrap();
        let twice = parse(&once).to_yaml().unwrap();

        assert_eq!(once, twice);
        assert_eq!(parse(&once), doc);
    }

    #[test]
    fn null_collections_read_as_empty() {
        let doc = parse("apiVersion: v1\nclusters: null\nusers: null\ncontexts: null\ncurrent-context: \"\"\n");

        assert!(doc.clusters.is_empty());
        assert!(doc.users.is_empty());
        assert!(doc.contexts.is_empty());
        assert!(doc.current().is_none());
    }

    #[test]
    fn upsert_replaces_in_place_and_drops_duplicates() {
        let mut doc = Kubeconfig::default();
        doc.upsert_context(named_context("a"));
        doc.upsert_context(named_context("b"));
        doc.contexts.push(named_context("a"));

        let mut replacement = named_context("a");
        replacement.context.namespace = Some("ns".to_string());
        doc.upsert_context(replacement.clone());

        let names: Vec<_> = doc.contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(doc.contexts[0], replacement);
    }

    #[test]
    fn ensure_user_creates_once() {
        let mut doc = Kubeconfig::default();

        assert!(doc.ensure_user("a", User::default));
        assert!(!doc.ensure_user("a", || panic!("user must be reused")));
        assert_eq!(doc.users.len(), 1);
    }

    #[test]
    fn set_current_requires_context() {
        let mut doc = Kubeconfig::default();
        assert!(doc.set_current("missing").is_err());

        doc.upsert_context(named_context("a"));
        doc.set_current("a").unwrap();
        assert_eq!(doc.current_context, "a");
    }

    #[test]
    fn from_path_treats_document_without_content_as_not_configured() {
        let dir = tempfile::TempDir::new().unwrap();
        for (idx, content) in ["# managed by kubectl\n", "---\n"].iter().enumerate() {
            let path = dir.path().join(format!("config-{}", idx));
            std::fs::write(&path, content).unwrap();

            let err = Kubeconfig::from_path(&path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotConfigured, "{:?}", content);
        }
    }

    #[test]
    fn failed_write_is_write_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("config");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "original").unwrap();

        let err = parse(KUBECONFIG).write(&target).unwrap_err();

        assert!(matches!(err, KubeconfigError::FileWrite { .. }));
        assert_eq!(err.kind(), ErrorKind::Write);
        assert_eq!(std::fs::read_to_string(target.join("keep")).unwrap(), "original");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

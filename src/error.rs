use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Client,
    Document,
    Change,
    Snapshot,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Client => write!(f, "client"),
            ResourceType::Document => write!(f, "document"),
            ResourceType::Change => write!(f, "change"),
            ResourceType::Snapshot => write!(f, "snapshot"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncdbErrorCode {
    ClientNotFound,
    DocumentNotFound,
    ChangeNotFound,
    SnapshotNotFound,
    Conflict,
    NeverAttached,
    Validation,
}

impl SyncdbErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncdbErrorCode::ClientNotFound => "client_not_found",
            SyncdbErrorCode::DocumentNotFound => "document_not_found",
            SyncdbErrorCode::ChangeNotFound => "change_not_found",
            SyncdbErrorCode::SnapshotNotFound => "snapshot_not_found",
            SyncdbErrorCode::Conflict => "conflict",
            SyncdbErrorCode::NeverAttached => "never_attached",
            SyncdbErrorCode::Validation => "validation",
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncdbError {
    #[error("{resource_type} '{resource_id}' not found")]
    NotFound {
        resource_type: ResourceType,
        resource_id: String,
    },
    #[error("conflict error: {0}")]
    Conflict(String),
    #[error("client '{client_id}' has never attached document '{doc_id}'")]
    NeverAttached { client_id: String, doc_id: String },
    #[error("validation error: {0}")]
    Validation(String),
}

impl SyncdbError {
    pub fn not_found(resource_type: ResourceType, resource_id: impl Into<String>) -> Self {
        SyncdbError::NotFound {
            resource_type,
            resource_id: resource_id.into(),
        }
    }

    pub fn code(&self) -> SyncdbErrorCode {
        match self {
            SyncdbError::NotFound { resource_type, .. } => match resource_type {
                ResourceType::Client => SyncdbErrorCode::ClientNotFound,
                ResourceType::Document => SyncdbErrorCode::DocumentNotFound,
                ResourceType::Change => SyncdbErrorCode::ChangeNotFound,
                ResourceType::Snapshot => SyncdbErrorCode::SnapshotNotFound,
            },
            SyncdbError::Conflict(_) => SyncdbErrorCode::Conflict,
            SyncdbError::NeverAttached { .. } => SyncdbErrorCode::NeverAttached,
            SyncdbError::Validation(_) => SyncdbErrorCode::Validation,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code().as_str()
    }
}

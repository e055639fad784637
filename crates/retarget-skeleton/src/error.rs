/// Errors raised while building or editing a [`crate::SkeletonGraph`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    #[error("bone `{name}` already exists")]
    DuplicateName { name: String },
    #[error("bone `{name}` not found")]
    MissingBone { name: String },
    #[error("bone `{name}` has no parent but `{root}` is already the root")]
    MultipleRoots { name: String, root: String },
    #[error("bone `{child}` is not a child of `{parent}`")]
    NotChild { parent: String, child: String },
    #[error("skeleton has no bones")]
    Empty,
}

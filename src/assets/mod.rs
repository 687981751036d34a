pub mod import;
pub mod loaders;
pub mod scene_asset;

pub use import::{AssetBundle, AssetImporter, ImportedNode, LoadFlags};
#[cfg(feature = "gltf")]
pub use loaders::GltfImporter;
pub use scene_asset::SceneAsset;

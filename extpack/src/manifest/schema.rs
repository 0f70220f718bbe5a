//! Manifest schema: document paths, element order and well-known identifiers.

/// In-package path of the manifest document.
pub const MANIFEST_PATH: &str = "extension.vsixmanifest";

/// In-package path of the localization fragment.
pub const LOC_PATH: &str = "Extension.vsixlangpack";

pub const MANIFEST_VERSION: &str = "2.0.0";
pub const VSX_NAMESPACE: &str = "http://schemas.microsoft.com/developer/vsx-schema/2011";
pub const VSX_DESIGN_NAMESPACE: &str =
    "http://schemas.microsoft.com/developer/vsx-schema-design/2011";
pub const DEFAULT_LANGUAGE: &str = "en-US";

// Document paths.

pub const ROOT_ELEMENT: &str = "PackageManifest";
pub const METADATA_ELEMENT: &str = "Metadata";

pub const IDENTITY_ID: &str = "PackageManifest.Metadata[0].Identity[0].$.Id";
pub const IDENTITY_VERSION: &str = "PackageManifest.Metadata[0].Identity[0].$.Version";
pub const IDENTITY_PUBLISHER: &str = "PackageManifest.Metadata[0].Identity[0].$.Publisher";
pub const IDENTITY_LANGUAGE: &str = "PackageManifest.Metadata[0].Identity[0].$.Language";
pub const DISPLAY_NAME: &str = "PackageManifest.Metadata[0].DisplayName[0]";
pub const DESCRIPTION: &str = "PackageManifest.Metadata[0].Description[0]._";
pub const DESCRIPTION_SPACE: &str = "PackageManifest.Metadata[0].Description[0].$.xml:space";
pub const RELEASE_NOTES: &str = "PackageManifest.Metadata[0].ReleaseNotes[0]";
pub const ICON: &str = "PackageManifest.Metadata[0].Icon[0]";
pub const LICENSE: &str = "PackageManifest.Metadata[0].License[0]";
pub const TAGS: &str = "PackageManifest.Metadata[0].Tags[0]";
pub const CATEGORIES: &str = "PackageManifest.Metadata[0].Categories[0]";
pub const GALLERY_FLAGS: &str = "PackageManifest.Metadata[0].GalleryFlags[0]";
pub const BADGES: &str = "PackageManifest.Metadata[0].Badges[0].Badge";
pub const PROPERTIES: &str = "PackageManifest.Metadata[0].Properties[0].Property";
pub const INSTALLATION_TARGETS: &str = "PackageManifest.Installation[0].InstallationTarget";
pub const ASSETS: &str = "PackageManifest.Assets[0].Asset";

/// Serialization order of the children of `PackageManifest`.
pub const ROOT_ORDER: &[&str] = &["$", "Metadata", "Installation", "Dependencies", "Assets"];

/// Serialization order of the children of `Metadata`.
pub const METADATA_ORDER: &[&str] = &[
    "Identity",
    "DisplayName",
    "Description",
    "ReleaseNotes",
    "Icon",
    "License",
    "Tags",
    "Categories",
    "GalleryFlags",
    "Badges",
    "Properties",
];

// Asset types.

pub const ICONS_ASSET_PREFIX: &str = "Microsoft.VisualStudio.Services.Icons.";
pub const DEFAULT_ICON_ASSET: &str = "Microsoft.VisualStudio.Services.Icons.Default";
pub const SCREENSHOTS_ASSET_PREFIX: &str = "Microsoft.VisualStudio.Services.Screenshots.";
pub const CONTENT_ASSET_PREFIX: &str = "Microsoft.VisualStudio.Services.Content.";
pub const DETAILS_ASSET: &str = "Microsoft.VisualStudio.Services.Content.Details";
pub const LICENSE_ASSET: &str = "Microsoft.VisualStudio.Services.Content.License";

// Property ids.

pub const LINKS_PROPERTY_PREFIX: &str = "Microsoft.VisualStudio.Services.Links.";
pub const GITHUB_LINK_PROPERTY: &str = "Microsoft.VisualStudio.Services.Links.GitHub";
pub const BRANDING_PROPERTY_PREFIX: &str = "Microsoft.VisualStudio.Services.Branding.";
pub const ENABLE_QNA_PROPERTY: &str = "Microsoft.VisualStudio.Services.EnableMarketplaceQnA";
pub const QNA_LINK_PROPERTY: &str = "Microsoft.VisualStudio.Services.CustomerQnALink";
pub const GFM_PROPERTY: &str = "Microsoft.VisualStudio.Services.GitHubFlavoredMarkdown";

/// Gallery flag toggled by the `public` key.
pub const PUBLIC_FLAG: &str = "Public";

/// Source attribute value of every asset entry.
pub const FILE_SOURCE: &str = "File";

pub mod chapter;
pub mod novel;
pub mod url;

pub use chapter::Chapter;
pub use novel::{ChapterRef, FeaturedNovel, HomePage, NovelDetail, NovelSummary, UpdatedAt};
pub use url::{CanonicalUrl, ChapterId, NovelId, PageKind, SourceSite};

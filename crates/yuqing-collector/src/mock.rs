//! Deterministic stand-in adapter that fabricates plausible posts.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use yuqing_core::{AdapterError, PlatformAdapter, RawItem};

const POSITIVE_TEMPLATES: &[&str] = &[
    "{keyword}技术真的太棒了！未来可期。",
    "刚体验了{keyword}相关产品，效果非常好！",
    "{keyword}的发展速度令人惊叹，期待更多应用。",
    "对{keyword}的未来充满信心，值得推荐。",
    "{keyword}让我们的生活更加便利，点赞支持！",
];

const NEUTRAL_TEMPLATES: &[&str] = &[
    "关于{keyword}的讨论越来越多了。",
    "今天看到一篇关于{keyword}的文章。",
    "{keyword}领域最近有不少新进展。",
    "分享一些{keyword}的学习资料。",
    "{keyword}市场规模持续扩大。",
];

const NEGATIVE_TEMPLATES: &[&str] = &[
    "{keyword}还有很多问题需要解决，有点失望。",
    "对{keyword}的某些应用持保留态度。",
    "{keyword}的产品太贵了，体验也很糟糕。",
    "担心{keyword}可能带来的负面影响。",
    "{keyword}技术还不够成熟，用起来又卡又慢。",
];

/// Seed used by the server and CLI; fixed so repeated runs hit the duplicate path.
pub const DEFAULT_MOCK_SEED: u64 = 20_240_601;

const AUTHORS: &[&str] = &["科技观察者", "AI前沿", "技术博主", "数据分析师", "机器学习爱好者"];

/// Generates posts for any keyword on one platform.
///
/// Output depends only on the seed, platform and keyword, so a repeated
/// search yields the same platform ids and exercises the duplicate path.
#[derive(Debug, Clone)]
pub struct MockDataAdapter {
    platform: String,
    seed: u64,
    anchor: DateTime<Utc>,
}

impl MockDataAdapter {
    pub fn new(platform: impl Into<String>, seed: u64) -> Self {
        Self {
            platform: platform.into(),
            seed,
            anchor: Utc::now(),
        }
    }

    /// Pins `published_at` values relative to `anchor` instead of now.
    #[must_use]
    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    fn rng_for(&self, keyword: &str) -> StdRng {
        // FNV-1a; stable across releases unlike the std hasher.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in self.platform.bytes().chain(keyword.bytes()) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        StdRng::seed_from_u64(self.seed ^ hash)
    }

    fn generate(&self, rng: &mut StdRng, keyword: &str, index: usize) -> RawItem {
        // 50% positive, 30% neutral, 20% negative.
        let templates = match rng.random_range(0..10) {
            0..=4 => POSITIVE_TEMPLATES,
            5..=7 => NEUTRAL_TEMPLATES,
            _ => NEGATIVE_TEMPLATES,
        };
        let template = templates.choose(rng).copied().unwrap_or_default();
        let author = AUTHORS.choose(rng).copied().unwrap_or_default();
        let serial: u32 = rng.random_range(100_000..1_000_000);

        RawItem {
            platform: self.platform.clone(),
            platform_id: format!("{}_mock_{index}_{serial}", self.platform),
            author: Some(author.to_string()),
            author_id: Some(format!("{}_{author}", self.platform)),
            content: template.replace("{keyword}", keyword),
            url: Some(format!("https://{}.example.com/post/{serial}", self.platform)),
            published_at: Some(self.anchor - Duration::hours(rng.random_range(1..=72))),
            likes: rng.random_range(10..5000),
            replies: rng.random_range(0..500),
            shares: rng.random_range(0..200),
        }
    }
}

#[async_trait]
impl PlatformAdapter for MockDataAdapter {
    async fn search(&self, keyword: &str, max_results: usize) -> Result<Vec<RawItem>, AdapterError> {
        let mut rng = self.rng_for(keyword);
        let items = (0..max_results)
            .map(|i| self.generate(&mut rng, keyword, i))
            .collect();
        tracing::debug!(platform = %self.platform, keyword, max_results, "generated mock items");
        Ok(items)
    }
}

//! Default word sets for sentiment scoring and keyword filtering.

/// Words counted as positive hits.
pub const POSITIVE_WORDS: &[&str] = &[
    // Chinese
    "好", "棒", "优秀", "喜欢", "满意", "赞", "不错", "推荐", "值得", "完美", "精彩", "优质",
    "高兴", "开心", "快乐", "幸福", "感谢", "支持", "爱", "美好", "漂亮", "帅", "酷", "厉害",
    "强", "牛",
    // English
    "good", "great", "excellent", "love", "like", "recommend", "awesome", "amazing", "happy",
    "best", "perfect", "nice",
];

/// Words counted as negative hits.
pub const NEGATIVE_WORDS: &[&str] = &[
    // Chinese
    "差", "烂", "糟糕", "失望", "不满", "垃圾", "讨厌", "后悔", "坑", "骗", "假", "劣质",
    "难用", "卡", "慢", "贵", "坏", "破", "臭", "恶心", "难看", "丑", "烦", "气", "怒", "恨",
    "骂", "投诉",
    // English
    "bad", "terrible", "awful", "hate", "worst", "poor", "disappointed", "disappointing",
    "scam", "broken", "slow", "expensive",
];

/// Tokens never reported as keywords.
pub const STOPWORDS: &[&str] = &[
    // Chinese
    "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上", "也",
    "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这",
    // English
    "the", "a", "an", "and", "or", "but", "is", "are", "was", "were", "be", "to", "of", "in",
    "on", "for", "with", "it", "this", "that", "i", "you", "we", "they", "my", "at", "as",
];

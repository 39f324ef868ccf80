use crate::model::{
    AgentPolicy, CollectionPolicy, ExecutorPolicy, FilterPolicy, LocatorPolicy, RegionPolicy,
    TypePriorities, ViewportWeights,
};

/// Function words dropped from a request before keyword matching. ASCII words
/// match whole tokens; the CJK entries are removed wherever they occur.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "please", "help", "me", "and", "then", "the", "a", "an", "to", "in", "on", "of", "for",
    "with", "帮我", "请", "把", "将", "给", "在", "到", "的", "和", "然后", "并且", "接着",
];

pub fn default_policy() -> AgentPolicy {
    AgentPolicy {
        rev: 1,
        filter: FilterPolicy {
            max_elements: 30,
            priorities: TypePriorities {
                form: 10,
                button: 8,
                tab: 7,
                menu: 6,
                list: 4,
                link: 3,
                text: 1,
            },
            viewport: ViewportWeights {
                visible: 5,
                near: 2,
                hidden: 0,
            },
            keyword_weight: 10,
            disabled_penalty: 5,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        },
        collection: CollectionPolicy {
            near_viewport_margin: 200.0,
            max_identifier_len: 50,
            max_near_elements: 2,
            max_parent_chain: 3,
        },
        regions: RegionPolicy {
            header_max_y: 150.0,
            footer_band: 200.0,
            sidebar_band: 250.0,
        },
        executor: ExecutorPolicy {
            batch_delay_ms: 100,
            wait_poll_ms: 100,
            wait_timeout_ms: 5_000,
            type_delay_ms: 50,
            drag_steps: 10,
            drag_step_delay_ms: 16,
            scroll_fraction: 0.8,
            highlight_color: "#ffeb3b".into(),
            underline_color: "#1a73e8".into(),
            allow_evaluate: true,
        },
        locator: LocatorPolicy {
            valid_confidence: 50,
            proximity_px: 50.0,
        },
        provenance: Default::default(),
    }
}

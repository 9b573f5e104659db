use super::LanguagePack;

pub(super) const PACK: LanguagePack = LanguagePack {
    code: "en",
    name: "English",
    correction: &[
        r"\bthat['’]?s (?:wrong|incorrect|not right|not correct)\b",
        r"\b(?:that['’]?s )?not what i (?:asked|wanted|meant|said)\b",
        r"\bno,? (?:i meant|i said|that['’]?s not)\b",
        r"\bactually,? i (?:meant|wanted|said)\b",
        r"\b(?:undo|revert|roll ?back) (?:that|this|it|the (?:change|last change|edit))\b",
        r"\bplease (?:undo|revert)\b",
        r"\byou (?:misunderstood|got it wrong|made a mistake|did it wrong)\b",
        r"\bwrong (?:file|one|answer|command|directory|folder|branch|path)\b",
        r"\bi didn['’]?t (?:ask|say) (?:for )?that\b",
    ],
    short_negative: &[
        r"^\s*(?:no+|nope|nah|stop|wrong|incorrect|undo|don['’]?t)\s*[.!]*\s*$",
    ],
    dissatisfaction: &[
        r"\bforget (?:it|about it)\b",
        r"\bnever ?mind\b",
        r"\buseless\b",
        r"\b(?:this|that|you)(?:['’]?re| is| are) (?:pointless|hopeless|terrible|garbage|worthless)\b",
        r"\bwaste of (?:my )?time\b",
        r"\bi give up\b",
        r"\byou(?:['’]re| are) not (?:helping|listening)\b",
        r"\b(?:this|it) (?:still )?(?:doesn['’]?t|does not) work\b",
        r"\bso frustrating\b",
        r"\bi['’]ll do it myself\b",
    ],
    satisfaction_override: &[
        r"\bthanks?\b[\s,!.]*(?:that['’]?s |this is |it['’]?s )?(?:perfect|great|awesome|exactly|excellent)\b",
        r"\b(?:perfect|great|awesome|excellent)\b[\s,!.]*thanks?\b",
        r"\bthank you\b",
        r"\bthat (?:worked|works|fixed it)\b",
        r"\bexactly what i (?:needed|wanted)\b",
        r"\bproblem solved\b",
    ],
    resolution: &[
        r"\b(?:sorry|i apologi[sz]e|my apologies|my mistake|my bad)\b",
        r"\blet me (?:try|fix|correct|redo) (?:that|this|it|again)\b",
        r"\b(?:i['’]ll|i will) try (?:again|a different approach|another (?:way|approach))\b",
    ],
    system_claim: &[
        r"\b(?:cpu|memory|ram|disk|swap)(?: usage| load| utili[sz]ation)? (?:is|was|sits|stands|at|is at|is currently)(?: at)? \d+(?:\.\d+)? ?%",
        r"\b(?:the )?(?:service|server|daemon|container|database|process|gateway|cluster) (?:is|are|was) (?:currently )?(?:running|up|down|stopped|online|offline|healthy|unhealthy|active|inactive)\b",
        r"\bthere (?:are|is|were) (?:currently )?\d+ (?:files?|errors?|processes|containers|requests|connections|users|items|entries|records|jobs)\b",
        r"\b(?:uptime|load average) (?:is|was|of) \d",
        r"\b\d+(?:\.\d+)? ?(?:gb|mb|tb|%) (?:free|used|available|remaining)\b",
    ],
    hedge: &[
        r"\bi think\b",
        r"\bi believe\b",
        r"\bmaybe\b",
        r"\bperhaps\b",
        r"\bprobably\b",
        r"\bpossibly\b",
        r"\bit seems\b",
        r"\bseems (?:to|like)\b",
        r"\bappears to\b",
        r"\bmight\b",
        r"\bi['’]m not sure\b",
        r"\bif i recall\b",
    ],
    decision: &[
        r"\blet['’]?s go with\b",
        r"\b(?:we['’]ll|we will|i['’]ll) use\b",
        r"\b(?:i|we) decided\b",
        r"\bgoing with\b",
        r"\bthe decision is\b",
        r"\bdecided to\b",
    ],
    topic: &[
        r"\bi meant\s+(?:the\s+)?([^.,;!?]{3,60})",
        r"\b(?:talking|asking) about\s+(?:the\s+)?([^.,;!?]{3,60})",
        r"\bwrong\s+([^.,;!?]{3,40}?)\s*(?:[.,;!?]|$)",
    ],
    noise_words: &[
        "it",
        "this",
        "that",
        "thing",
        "the thing",
        "something",
        "stuff",
        "everything",
        "anything",
        "one",
        "that one",
        "this one",
        "issue",
        "problem",
    ],
    keywords: &[
        "cpu",
        "memory",
        "ram",
        "disk",
        "swap",
        "uptime",
        "load",
        "service",
        "server",
        "daemon",
        "container",
        "database",
        "process",
        "gateway",
        "cluster",
        "files",
        "errors",
        "requests",
        "connections",
        "running",
        "%",
        "gb",
        "mb",
    ],
};

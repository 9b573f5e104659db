use super::LanguagePack;

pub(super) const PACK: LanguagePack = LanguagePack {
    code: "de",
    name: "Deutsch",
    correction: &[
        r"\bdas ist (?:falsch|nicht richtig|nicht korrekt)\b",
        r"\bdas (?:habe|hab) ich nicht (?:gemeint|gesagt|gewollt)\b",
        r"\bnein,? ich meinte\b",
        r"\beigentlich (?:meinte|wollte) ich\b",
        r"\b(?:mach|nimm) (?:das|es) r[üu]ckg[äa]ngig\b",
        r"\bdu hast (?:das|mich) (?:falsch verstanden|missverstanden)\b",
        r"\bfalsche(?:s|n)? (?:datei|befehl|verzeichnis|branch|pfad)\b",
    ],
    short_negative: &[r"^\s*(?:nein|n[ée]|stopp?|halt|falsch)\s*[.!]*\s*$"],
    dissatisfaction: &[
        r"\bvergiss es\b",
        r"\blass es\b",
        r"\bnutzlos\b",
        r"\bzeitverschwendung\b",
        r"\bich gebe auf\b",
        r"\bfunktioniert (?:immer )?(?:noch )?nicht\b",
        r"\bdas bringt nichts\b",
        r"\bmach ich selbst\b",
    ],
    satisfaction_override: &[
        r"\bdanke\b[\s,!.]*(?:das ist )?(?:perfekt|super|toll|genau)\b",
        r"\b(?:perfekt|super|toll)\b[\s,!.]*danke\b",
        r"\bvielen dank\b",
        r"\bdas (?:hat )?(?:jetzt |wieder )?funktioniert(?: (?:jetzt|wieder|endlich|super))*\s*(?:[.!,)]|$)",
    ],
    resolution: &[
        r"\b(?:entschuldigung|tut mir leid|sorry|mein fehler)\b",
        r"\bich versuche es (?:noch einmal|erneut|nochmal)\b",
    ],
    system_claim: &[
        r"\b(?:cpu|speicher|arbeitsspeicher|ram|festplatte)(?:auslastung)? (?:ist |liegt )?(?:bei|auf) \d+(?:[.,]\d+)? ?%",
        r"\b(?:der )?(?:dienst|server|container|prozess)(?: l[äa]uft| ist (?:gestoppt|aktiv|inaktiv|online|offline))\b",
        r"\bes gibt \d+ (?:dateien|fehler|prozesse|container|verbindungen|benutzer)\b",
        r"\b\d+(?:[.,]\d+)? ?(?:gb|mb|%) (?:frei|belegt|verf[üu]gbar)\b",
    ],
    hedge: &[
        r"\bich glaube\b",
        r"\bvielleicht\b",
        r"\bwahrscheinlich\b",
        r"\bm[öo]glicherweise\b",
        r"\bscheint\b",
        r"\bich bin (?:mir )?nicht sicher\b",
    ],
    decision: &[
        r"\bwir nehmen\b",
        r"\bwir verwenden\b",
        r"\bich habe mich f[üu]r\b",
        r"\bentschieden\b",
    ],
    topic: &[r"\bich meinte\s+(?:die |der |das |den )?([^.,;!?]{3,60})"],
    noise_words: &["das", "es", "etwas", "etwas anderes", "alles", "nichts", "problem", "das problem"],
    keywords: &[
        "cpu",
        "speicher",
        "ram",
        "festplatte",
        "dienst",
        "server",
        "container",
        "prozess",
        "dateien",
        "fehler",
        "läuft",
        "%",
        "gb",
        "mb",
    ],
};

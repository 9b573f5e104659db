use super::LanguagePack;

pub(super) const PACK: LanguagePack = LanguagePack {
    code: "fr",
    name: "Français",
    correction: &[
        r"\bc['’]est (?:faux|incorrect|pas (?:ça|ca|correct|juste))\b",
        r"\bce n['’]est pas ce que (?:j['’]ai demandé|je voulais|j['’]ai dit)\b",
        r"\bnon,? je voulais dire\b",
        r"\ben fait,? je (?:voulais|pensais)\b",
        r"\b(?:annule|annuler|reviens sur) (?:ça|ca|cela|le changement|les changements)\b",
        r"\btu (?:t['’]es trompé|as mal compris)\b",
        r"\bmauvais (?:fichier|répertoire|dossier|chemin|commande)\b",
    ],
    short_negative: &[r"^\s*(?:non+|arr[êe]te|stop|faux)\s*[.!]*\s*$"],
    dissatisfaction: &[
        r"\blaisse tomber\b",
        r"\boublie(?:z)?[- ](?:ça|ca)\b",
        r"\binutile\b",
        r"\bperte de temps\b",
        r"\bj['’]abandonne\b",
        r"\b(?:ça|ca) (?:ne )?(?:marche|fonctionne) (?:toujours )?pas\b",
        r"\bje vais le faire moi-m[êe]me\b",
    ],
    satisfaction_override: &[
        r"\bmerci\b[\s,!.]*(?:c['’]est )?(?:parfait|super|génial|genial|excellent)\b",
        r"\b(?:parfait|super|génial|genial)\b[\s,!.]*merci\b",
        r"\bmerci beaucoup\b",
        r"\b(?:ça|ca) (?:marche|fonctionne)(?: (?:bien|parfaitement|maintenant|enfin))*\s*(?:[.!,)]|$)",
    ],
    resolution: &[
        r"\b(?:désolé|desole|pardon|excusez-moi|mon erreur)\b",
        r"\bje (?:vais )?(?:réessayer|reessayer|corriger)\b",
    ],
    system_claim: &[
        r"\b(?:le |la )?(?:cpu|processeur|mémoire|memoire|ram|disque)(?: est)? (?:à|a) \d+(?:[.,]\d+)? ?%",
        r"\b(?:le )?(?:service|serveur|conteneur|processus)(?: est)? (?:en cours d['’]exécution|actif|inactif|arrêté|arrete|démarré)\b",
        r"\bil y a \d+ (?:fichiers?|erreurs?|processus|conteneurs|connexions|utilisateurs)\b",
        r"\b\d+(?:[.,]\d+)? ?(?:go|mo|gb|mb|%) (?:libres?|utilisés?|disponibles?)\b",
    ],
    hedge: &[
        r"\bje pense\b",
        r"\bje crois\b",
        r"\bpeut-[êe]tre\b",
        r"\bprobablement\b",
        r"\bil semble\b",
        r"\bje ne suis pas s[ûu]r\b",
    ],
    decision: &[
        r"\bon part sur\b",
        r"\bon (?:utilise|utilisera|garde)\b",
        r"\bj['’]ai décidé\b",
        r"\bnous avons décidé\b",
    ],
    topic: &[r"\bje voulais dire\s+(?:le |la |les |l['’])?([^.,;!?]{3,60})"],
    noise_words: &["ça", "ca", "cela", "ceci", "quelque chose", "autre chose", "tout", "rien", "problème"],
    keywords: &[
        "cpu",
        "processeur",
        "mémoire",
        "ram",
        "disque",
        "service",
        "serveur",
        "conteneur",
        "processus",
        "fichiers",
        "erreurs",
        "%",
        "go",
        "mo",
    ],
};

use super::LanguagePack;

pub(super) const PACK: LanguagePack = LanguagePack {
    code: "es",
    name: "Español",
    correction: &[
        r"\beso (?:está|esta|es) (?:mal|incorrecto|equivocado)\b",
        r"\bno es (?:lo que|eso lo que) (?:pedí|pedi|quería|queria|dije)\b",
        r"\bno,? (?:me refería|quise decir|dije)\b",
        r"\ben realidad (?:quería|queria|quise decir)\b",
        r"\b(?:deshaz|deshacer|revierte|revertir) (?:eso|esto|el cambio|los cambios)\b",
        r"\bte equivocaste\b",
        r"\bno entendiste\b",
        r"\b(?:archivo|comando|directorio|rama) equivocad[oa]\b",
    ],
    short_negative: &[
        r"^\s*(?:no+|para|alto|mal|incorrecto|detente)\s*[.!¡]*\s*$",
    ],
    dissatisfaction: &[
        r"\bolv[ií]dalo\b",
        r"\bd[ée]jalo\b",
        r"\bno sirve(?:s)? (?:para nada|de nada)\b",
        r"\bin[úu]til\b",
        r"\bp[ée]rdida de tiempo\b",
        r"\bme rindo\b",
        r"\b(?:sigue sin|todav[ií]a no) funciona(?:r)?\b",
        r"\bno funcion[óo]\b",
        r"\blo hago yo mismo\b",
        r"\bqu[ée] frustrante\b",
    ],
    satisfaction_override: &[
        r"\bgracias\b[\s,!.]*(?:es |est[áa] )?(?:perfecto|genial|excelente)\b",
        r"\b(?:perfecto|genial|excelente)\b[\s,!.]*gracias\b",
        r"\bmuchas gracias\b",
        r"(?:^|[.!¡,;]\s*|\b(?:eso|ya|s[ií]) )funcion[óo]\b",
        r"\bjusto lo que necesitaba\b",
    ],
    resolution: &[
        r"\b(?:perd[óo]n|lo siento|disculpa|disculpas|mi error)\b",
        r"\b(?:d[ée]jame|voy a) (?:intentar|corregir|arreglar)(?:lo)?(?: de nuevo| otra vez)?\b",
    ],
    system_claim: &[
        r"\b(?:la )?(?:cpu|memoria|ram|disco)(?: est[áa]| se encuentra)? (?:al|en) \d+(?:[.,]\d+)? ?%",
        r"\b(?:el )?(?:servicio|servidor|contenedor|proceso|demonio)(?: est[áa])? (?:corriendo|activo|inactivo|ca[íi]do|detenido|funcionando)\b",
        r"\bhay \d+ (?:archivos?|errores?|procesos|contenedores|conexiones|usuarios|registros)\b",
        r"\b\d+(?:[.,]\d+)? ?(?:gb|mb|%) (?:libres?|usad[oa]s?|disponibles?)\b",
    ],
    hedge: &[
        r"\bcreo que\b",
        r"\bquiz[áa]s?\b",
        r"\btal vez\b",
        r"\bprobablemente\b",
        r"\bparece que\b",
        r"\bno estoy seguro\b",
        r"\bposiblemente\b",
    ],
    decision: &[
        r"\bvamos con\b",
        r"\busaremos\b",
        r"\bdecid[ií](?:mos)?\b",
        r"\bnos quedamos con\b",
        r"\bla decisi[óo]n es\b",
    ],
    topic: &[
        r"\bme refer[íi]a a\s+(?:la |el |los |las )?([^.,;!?]{3,60})",
        r"\bhablaba de\s+(?:la |el |los |las )?([^.,;!?]{3,60})",
        r"\bquise decir\s+(?:la |el |los |las )?([^.,;!?]{3,60})",
    ],
    noise_words: &[
        "eso",
        "esto",
        "algo",
        "algo más",
        "otra cosa",
        "la cosa",
        "cosa",
        "todo",
        "nada",
        "problema",
        "el problema",
        "lo otro",
    ],
    keywords: &[
        "cpu",
        "memoria",
        "ram",
        "disco",
        "servicio",
        "servidor",
        "contenedor",
        "proceso",
        "archivos",
        "errores",
        "conexiones",
        "corriendo",
        "%",
        "gb",
        "mb",
    ],
};

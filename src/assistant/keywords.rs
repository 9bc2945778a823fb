/*!
 * Keyword replies for short conversational messages.
 */

use crate::language::{Language, Localized};

/// Ordered (keyword, reply) table per language; the first keyword found in
/// the lower-cased message wins.
#[derive(Debug, Clone)]
pub struct KeywordRules {
    rules: Localized<Vec<(String, String)>>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordRules {
    pub fn new(rules: Localized<Vec<(String, String)>>) -> Self {
        let lowered = |table: Vec<(String, String)>| {
            table
                .into_iter()
                .map(|(keyword, reply)| (keyword.to_lowercase(), reply))
                .collect::<Vec<_>>()
        };
        Self {
            rules: Localized::new(lowered(rules.es), lowered(rules.en)),
        }
    }

    pub fn builtin() -> Self {
        let table = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, r)| (k.to_string(), r.to_string()))
                .collect::<Vec<_>>()
        };
        Self::new(Localized::new(table(BUILTIN_ES), table(BUILTIN_EN)))
    }

    /// Reply for the first keyword contained in `message`
    pub fn find(&self, message: &str, language: Language) -> Option<&str> {
        let message = message.to_lowercase();
        self.rules
            .get(language)
            .iter()
            .find(|(keyword, _)| message.contains(keyword.as_str()))
            .map(|(_, reply)| reply.as_str())
    }
}

const BUILTIN_ES: &[(&str, &str)] = &[
    ("hola", "¡Klk! ¿En qué puedo ayudarte hoy con Tix.do?"),
    ("gracias", "¡De nada! Estoy aquí para ayudarte con todo lo relacionado a Tix.do."),
    ("adios", "¡Chao! Gracias por usar Tix-o-bot. ¡Que disfrutes tus eventos!"),
    ("ayuda", "Puedo ayudarte con información sobre eventos, entradas, reembolsos y más. ¿Qué necesitas saber?"),
    ("evento", "Tix.do tiene muchos eventos increíbles. ¿Buscas algo específico como conciertos, teatro o deportes?"),
];

const BUILTIN_EN: &[(&str, &str)] = &[
    ("hello", "Hi there! How can I help you with Tix.do today?"),
    ("thanks", "You're welcome! I'm here to help with all things Tix.do."),
    ("bye", "Goodbye! Thanks for using Tix-o-bot. Enjoy your events!"),
    ("help", "I can help you with information about events, tickets, refunds and more. What do you need to know?"),
    ("event", "Tix.do has many amazing events. Are you looking for something specific like concerts, theater, or sports?"),
];

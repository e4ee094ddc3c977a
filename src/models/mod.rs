// ============================================================================
// MODELS
// ============================================================================
//
// Une entité SeaORM par table PostgreSQL.
//
//   - users              : comptes (local + OAuth GitHub)
//   - user_relations     : amis et utilisateurs bloqués
//   - tournaments        : lobbies et tournois
//   - tournament_players : inscriptions (tournament_id, username)
//   - matches            : matchs seuls ou rounds de tournoi
//   - messages           : chat global, privé, tournoi
//   - released_usernames : noms réservés après renommage ou suppression
//   - health             : health check de l'API
//   - dto                : vues agrégées pour les réponses API
//
// Les usernames servent de clés étrangères partout ; un renommage se propage
// par ON UPDATE CASCADE.
//
// ============================================================================

pub mod dto;
pub mod health;
pub mod matches;
pub mod messages;
pub mod released_usernames;
pub mod tournament_players;
pub mod tournaments;
pub mod user_relations;
pub mod users;

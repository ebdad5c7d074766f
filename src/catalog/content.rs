//! Builtin induction content, used to seed an empty `topics` table

use super::TopicItem;

/// Ordered `(topic, item)` rows shipped with the bot
pub fn builtin_items() -> Vec<(&'static str, TopicItem)> {
    vec![
        (
            "riesgos",
            TopicItem::info(
                "Los riesgos y peligros son los elementos que pueden generar accidentes, \
                 incidentes o emergencias. Para prevenirlos: aplica el análisis de trabajo \
                 seguro, usa adecuadamente los EPP, realiza ejercicios de estiramiento, \
                 reporta actos y condiciones inseguras y reporta tu estado de salud.",
            ),
        ),
        (
            "riesgos",
            TopicItem::question(
                "1. ¿Qué debe hacer un trabajador para prevenir riesgos?\n\
                 a) No reportar actos inseguros\n\
                 b) Hacer ejercicios de estiramiento y usar EPP\n\
                 c) Ignorar el estado de salud\n\
                 d) Ninguna de las anteriores",
                "b",
            ),
        ),
        (
            "aspectos",
            TopicItem::info(
                "Aspectos ambientales: componentes de un producto, actividad o servicio que \
                 pueden interactuar con el medio ambiente, como el consumo de agua, el \
                 consumo de energía o la generación de residuos.",
            ),
        ),
        (
            "aspectos",
            TopicItem::question(
                "1. ¿Cuál es un ejemplo de aspecto ambiental?\n\
                 a) Consumo de agua\n\
                 b) Consumo de energía\n\
                 c) Generación de residuos\n\
                 d) Todas las anteriores",
                "d",
            ),
        ),
        (
            "impacto",
            TopicItem::info(
                "Impacto ambiental: efecto real que un aspecto ambiental tiene sobre el medio. \
                 Por ejemplo: contaminación del agua, residuos sin segregar o un alto consumo \
                 de energía.",
            ),
        ),
        (
            "impacto",
            TopicItem::question(
                "1. ¿Qué es un impacto ambiental?\n\
                 a) Una acción preventiva\n\
                 b) Un efecto real sobre el ambiente\n\
                 c) Un tipo de EPP\n\
                 d) Un comité de seguridad",
                "b",
            ),
        ),
        (
            "procedimientos",
            TopicItem::info(
                "Algunas tareas son de alto riesgo. Para realizarlas necesitas un permiso de \
                 trabajo en alturas, usar arnés al subir o bajar de los vehículos, aislar el \
                 área de posibles fuentes de ignición y aplicar el análisis de \
                 comportamientos críticos.",
            ),
        ),
        (
            "procedimientos",
            TopicItem::question(
                "1. ¿Qué se requiere para trabajos en alturas (>2m)?\n\
                 a) Permiso y uso de arnés\n\
                 b) Nada especial\n\
                 c) Solo casco\n\
                 d) Ninguna de las anteriores",
                "a",
            ),
        ),
        (
            "comites",
            TopicItem::info(
                "Comités: Comité de Seguridad y Salud en el Trabajo y Comité de Convivencia \
                 Laboral.",
            ),
        ),
        (
            "comites",
            TopicItem::question(
                "1. Una función del Comité de Seguridad y Salud en el Trabajo es:\n\
                 a) Capacitar en seguridad\n\
                 b) Vender EPP\n\
                 c) Velar por el cumplimiento de los programas de seguridad\n\
                 d) Ninguna",
                "c",
            ),
        ),
        (
            "emergencias",
            TopicItem::info(
                "En el sitio, conoce el plan de emergencia en caso de accidente o incidente: \
                 sigue las instrucciones del personal, dirígete al área de atención y al punto \
                 de encuentro, conserva la calma y ubica el punto de atención más cercano de \
                 la ARL.",
            ),
        ),
        (
            "emergencias",
            TopicItem::question(
                "1. En caso de evacuación debe:\n\
                 a) Correr y gritar\n\
                 b) Conservar la calma y dirigirse al punto de encuentro\n\
                 c) Usar el celular\n\
                 d) Esconderse",
                "b",
            ),
        ),
        (
            "responsabilidades",
            TopicItem::info(
                "Tus responsabilidades durante la prestación del servicio: apoyar la limpieza \
                 y contención, usar EPP, reportar actos inseguros, no operar maquinaria sin \
                 capacitación, realizar estiramientos y garantizar hidratación y descanso.",
            ),
        ),
        (
            "responsabilidades",
            TopicItem::question(
                "1. Función de los trabajadores:\n\
                 a) Reportar actos inseguros y usar EPP\n\
                 b) Operar equipos sin capacitación\n\
                 c) Ignorar su salud\n\
                 d) No hidratarse",
                "a",
            ),
        ),
    ]
}
